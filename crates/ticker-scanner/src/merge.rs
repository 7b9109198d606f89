use crate::aggregate::WindowCounts;
use std::collections::BTreeSet;
use trend_core::{ScoreMap, TickerRow};

/// Pointwise integer sum over the union of keys. Associative and commutative;
/// this is the single reduce step shared by the rocket merger and the
/// parallel aggregator.
pub fn merge_counts(mut into: ScoreMap, from: ScoreMap) -> ScoreMap {
    for (ticker, count) in from {
        *into.entry(ticker).or_insert(0) += count;
    }
    into
}

/// Merge the two windows into one row per ticker over the union of both
/// windows' key sets. Missing entries are zero, so a ticker seen only in the
/// previous window still appears, with `recent = 0` and a negative change.
/// Rocket totals sum both windows and align to the same ticker set. Rows come
/// back in ascending ticker order; ranking reorders them later.
pub fn score_table(current: &WindowCounts, previous: &WindowCounts) -> Vec<TickerRow> {
    let tickers: BTreeSet<&str> = current
        .scores
        .keys()
        .chain(previous.scores.keys())
        .map(String::as_str)
        .collect();

    tickers
        .into_iter()
        .map(|ticker| {
            let recent = current.scores.get(ticker).copied().unwrap_or(0);
            let prev = previous.scores.get(ticker).copied().unwrap_or(0);
            let rockets = current.rockets.get(ticker).copied().unwrap_or(0)
                + previous.rockets.get(ticker).copied().unwrap_or(0);
            TickerRow {
                ticker: ticker.to_string(),
                recent,
                prev,
                change: recent - prev,
                rockets,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(scores: &[(&str, i64)], rockets: &[(&str, i64)]) -> WindowCounts {
        WindowCounts {
            scores: scores.iter().map(|(t, n)| (t.to_string(), *n)).collect(),
            rockets: rockets.iter().map(|(t, n)| (t.to_string(), *n)).collect(),
        }
    }

    #[test]
    fn test_merge_counts_pointwise_sum() {
        let a: ScoreMap = [("GME".to_string(), 10), ("AMC".to_string(), 5)].into();
        let b: ScoreMap = [("GME".to_string(), 3), ("TSLA".to_string(), 7)].into();
        let merged = merge_counts(a, b);
        assert_eq!(merged.get("GME"), Some(&13));
        assert_eq!(merged.get("AMC"), Some(&5));
        assert_eq!(merged.get("TSLA"), Some(&7));
    }

    #[test]
    fn test_merge_counts_associative() {
        let a: ScoreMap = [("GME".to_string(), 1)].into();
        let b: ScoreMap = [("GME".to_string(), 2), ("AMC".to_string(), 4)].into();
        let c: ScoreMap = [("AMC".to_string(), 8)].into();
        let left = merge_counts(merge_counts(a.clone(), b.clone()), c.clone());
        let right = merge_counts(a, merge_counts(b, c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_score_table_union_and_change() {
        let current = counts(&[("GME", 100), ("AMC", 20)], &[("GME", 4)]);
        let previous = counts(&[("GME", 40), ("TSLA", 15)], &[("GME", 2), ("TSLA", 1)]);
        let rows = score_table(&current, &previous);

        assert_eq!(rows.len(), 3);
        let gme = rows.iter().find(|r| r.ticker == "GME").unwrap();
        assert_eq!((gme.recent, gme.prev, gme.change, gme.rockets), (100, 40, 60, 6));
        let amc = rows.iter().find(|r| r.ticker == "AMC").unwrap();
        assert_eq!((amc.recent, amc.prev, amc.change, amc.rockets), (20, 0, 20, 0));
        let tsla = rows.iter().find(|r| r.ticker == "TSLA").unwrap();
        assert_eq!((tsla.recent, tsla.prev, tsla.change, tsla.rockets), (0, 15, -15, 1));

        // change invariant holds for every row
        for row in &rows {
            assert_eq!(row.change, row.recent - row.prev);
        }
    }

    #[test]
    fn test_score_table_each_ticker_exactly_once() {
        let current = counts(&[("GME", 1), ("AMC", 1)], &[]);
        let previous = counts(&[("GME", 1), ("NOK", 1)], &[]);
        let rows = score_table(&current, &previous);
        let mut tickers: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
        tickers.dedup();
        assert_eq!(tickers, vec!["AMC", "GME", "NOK"]);
    }

    #[test]
    fn test_score_table_empty_windows() {
        let rows = score_table(&WindowCounts::default(), &WindowCounts::default());
        assert!(rows.is_empty());
    }
}
