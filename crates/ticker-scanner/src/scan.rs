use std::collections::HashSet;
use trend_core::SymbolUniverse;

/// U+1F680, the bullish-sentiment proxy.
pub const ROCKET: char = '\u{1F680}';

const MAX_TICKER_LEN: usize = 5;

/// Outcome of scanning one block of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Distinct known tickers mentioned. A symbol repeated within the same
    /// text appears once.
    pub tickers: HashSet<String>,
    /// Rocket glyph occurrences across the whole text, repetitions included.
    pub rockets: i64,
}

/// Scan free text for known ticker symbols and rocket emojis.
///
/// Candidate tokens are bare uppercase words of 1..=5 letters, or the same
/// with a `$` prefix. Candidates not present in `universe` are discarded
/// silently; false positives are expected and filtered, not reported.
pub fn scan_text(text: &str, universe: &SymbolUniverse) -> ScanResult {
    let mut result = ScanResult::default();

    for token in text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '$')) {
        let candidate = token.strip_prefix('$').unwrap_or(token);
        if candidate.is_empty() || candidate.len() > MAX_TICKER_LEN {
            continue;
        }
        if !candidate.chars().all(|c| c.is_ascii_uppercase()) {
            continue;
        }
        if universe.contains(candidate) && !result.tickers.contains(candidate) {
            result.tickers.insert(candidate.to_string());
        }
    }

    result.rockets = text.chars().filter(|&c| c == ROCKET).count() as i64;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> SymbolUniverse {
        SymbolUniverse::from_symbols(["GME", "AMC", "TSLA"])
    }

    #[test]
    fn test_scan_finds_dollar_and_bare_tickers() {
        let result = scan_text("I'm buying $GME and AMC \u{1F680}\u{1F680}", &universe());
        let mut tickers: Vec<&str> = result.tickers.iter().map(String::as_str).collect();
        tickers.sort();
        assert_eq!(tickers, vec!["AMC", "GME"]);
        assert_eq!(result.rockets, 2);
    }

    #[test]
    fn test_unknown_candidates_are_discarded() {
        let result = scan_text("YOLO $FAKE and HODL forever", &universe());
        assert!(result.tickers.is_empty());
        assert_eq!(result.rockets, 0);
    }

    #[test]
    fn test_repeated_ticker_counts_once_but_rockets_sum() {
        let result = scan_text(
            "GME \u{1F680} GME \u{1F680} $GME to the moon \u{1F680}",
            &universe(),
        );
        assert_eq!(result.tickers.len(), 1);
        assert!(result.tickers.contains("GME"));
        assert_eq!(result.rockets, 3);
    }

    #[test]
    fn test_lowercase_and_digit_tokens_rejected() {
        let result = scan_text("gme Gme GME2 $tsla AB12C", &universe());
        assert!(result.tickers.is_empty());
    }

    #[test]
    fn test_overlong_tokens_rejected() {
        let universe = SymbolUniverse::from_symbols(["GMEGME"]);
        let result = scan_text("GMEGME", &universe);
        assert!(result.tickers.is_empty());
    }

    #[test]
    fn test_scan_is_idempotent() {
        let text = "Rolling $TSLA calls into GME \u{1F680}";
        let first = scan_text(text, &universe());
        let second = scan_text(text, &universe());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_text_yields_empty_result() {
        let result = scan_text("", &universe());
        assert!(result.tickers.is_empty());
        assert_eq!(result.rockets, 0);
    }
}
