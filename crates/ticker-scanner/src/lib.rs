//! Ticker scoring core: text scanning, per-window aggregation, two-window
//! merging, and filter/rank. Everything here is synchronous and pure; I/O
//! lives in the client crates.

pub mod aggregate;
pub mod merge;
pub mod rank;
pub mod scan;

pub use aggregate::{aggregate_window, Concurrency, WindowCounts};
pub use merge::{merge_counts, score_table};
pub use rank::filter_and_rank;
pub use scan::{scan_text, ScanResult};
