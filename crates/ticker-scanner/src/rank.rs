use trend_core::{SortKey, TickerRow};

/// Drop rows whose current-window score is strictly below `min_score`, then
/// sort descending on the selected column with an ascending-ticker tie-break.
/// Only the recent score gates inclusion; previous score and change do not.
pub fn filter_and_rank(mut rows: Vec<TickerRow>, min_score: i64, key: SortKey) -> Vec<TickerRow> {
    rows.retain(|row| row.recent >= min_score);
    rows.sort_by(|a, b| {
        key.value_of(b)
            .cmp(&key.value_of(a))
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    rows
}
