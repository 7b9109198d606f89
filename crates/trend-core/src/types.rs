use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-ticker integer accumulator, used for both mention scores and rocket
/// counts. Absent key means zero.
pub type ScoreMap = HashMap<String, i64>;

/// A social-media submission reduced to the two fields the scoring pipeline
/// reads. Richer source objects are adapted to this shape at the client
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    /// Platform score (upvotes minus downvotes); may be negative.
    pub score: i64,
}

impl Post {
    pub fn new(text: impl Into<String>, score: i64) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// One row of the merged two-window score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRow {
    pub ticker: String,
    /// Accumulated mention score over the current window.
    pub recent: i64,
    /// Accumulated mention score over the previous window.
    pub prev: i64,
    /// recent - prev
    pub change: i64,
    /// Rocket-emoji total across both windows.
    pub rockets: i64,
}

impl TickerRow {
    pub fn total(&self) -> i64 {
        self.recent + self.prev
    }
}

/// Column to sort the result table by, numbered 1..=5 on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Total,
    Recent,
    Prev,
    Change,
    Rockets,
}

impl SortKey {
    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            1 => Some(SortKey::Total),
            2 => Some(SortKey::Recent),
            3 => Some(SortKey::Prev),
            4 => Some(SortKey::Change),
            5 => Some(SortKey::Rockets),
            _ => None,
        }
    }

    /// Extract the sort column value from a row.
    pub fn value_of(&self, row: &TickerRow) -> i64 {
        match self {
            SortKey::Total => row.total(),
            SortKey::Recent => row.recent,
            SortKey::Prev => row.prev,
            SortKey::Change => row.change,
            SortKey::Rockets => row.rockets,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Total => "Total",
            SortKey::Recent => "Recent",
            SortKey::Prev => "Prev",
            SortKey::Change => "Change",
            SortKey::Rockets => "Rockets",
        }
    }
}

/// Live market metadata for one ticker. Every field beyond the symbol is
/// best-effort; a quote source may omit any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerMetadata {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
    pub volume: Option<i64>,
    pub avg_volume_3m: Option<i64>,
    // Advanced-mode extras
    pub market_cap: Option<f64>,
    pub float_shares: Option<i64>,
    pub industry: Option<String>,
    pub short_percent_float: Option<f64>,
}

/// A score-table row joined with its (optional) market metadata. The ticker
/// symbol is the join key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub row: TickerRow,
    pub meta: Option<TickerMetadata>,
}

/// A bounded time range, half-open on neither side: posts created in
/// [after, before] belong to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

impl TimeWindow {
    /// The current `interval_hours` window and the adjacent window
    /// immediately before it, ending at `now`.
    pub fn recent_and_previous(interval_hours: i64, now: DateTime<Utc>) -> (Self, Self) {
        let span = Duration::hours(interval_hours);
        let recent = TimeWindow {
            after: now - span,
            before: now,
        };
        let previous = TimeWindow {
            after: now - span - span,
            before: now - span,
        };
        (recent, previous)
    }
}
