use crate::TrendError;
use std::collections::HashSet;
use std::path::Path;

/// Curated default allow-list. Large caps plus the high-chatter retail names
/// that dominate finance forums. A full exchange listing can be loaded with
/// `SymbolUniverse::from_file` when broader coverage is wanted.
const DEFAULT_SYMBOLS: &[&str] = &[
    // Technology
    "AAPL", "MSFT", "GOOGL", "GOOG", "NVDA", "META", "AVGO", "TSM", "ORCL", "CRM",
    "AMD", "ADBE", "INTC", "CSCO", "QCOM", "TXN", "IBM", "MU", "SNOW", "NET",
    "DDOG", "CRWD", "PANW", "ZS", "SHOP", "SQ", "UBER", "SNAP", "ROKU", "PLTR",
    // Healthcare
    "JNJ", "UNH", "PFE", "ABBV", "MRK", "LLY", "TMO", "ABT", "BMY", "AMGN",
    "GILD", "MDT", "MRNA", "NVAX", "VRTX",
    // Financials
    "JPM", "BAC", "GS", "V", "MA", "WFC", "MS", "AXP", "SCHW", "BLK",
    "C", "COIN", "HOOD", "SOFI", "ICE",
    // Energy
    "XOM", "CVX", "COP", "SLB", "EOG", "OXY", "HAL", "MPC", "PSX", "VLO",
    // Consumer
    "AMZN", "TSLA", "HD", "NKE", "SBUX", "MCD", "LOW", "BKNG", "CMG", "GM",
    "F", "DIS", "NFLX", "CMCSA", "T", "VZ", "TMUS", "EA", "TTWO", "WBD",
    "PG", "KO", "PEP", "COST", "WMT", "PM", "MO", "CL", "KHC", "GIS",
    // Industrials / materials
    "CAT", "BA", "HON", "UPS", "GE", "RTX", "DE", "LMT", "UNP", "FDX",
    "LIN", "APD", "NEM", "FCX", "DOW", "NUE", "X", "CLF", "AA", "VALE",
    // Forum favorites
    "GME", "AMC", "BB", "NOK", "BBBY", "SNDL", "TLRY", "CLOV", "WISH", "SPCE",
    "RKT", "UWMC", "MVIS", "WKHS", "RIDE", "NIO", "XPEV", "LI", "LCID", "RIVN",
    "DKNG", "PENN", "CHWY", "PTON", "ZM", "DOCU", "ABNB", "DASH", "RBLX", "U",
    // ETFs that trade like tickers in forum chatter
    "SPY", "QQQ", "IWM", "VTI", "ARKK", "TQQQ", "SQQQ", "UVXY", "VXX", "GLD",
];

/// Immutable set of known ticker symbols. Injected into the scanner as an
/// explicit value; membership lookup is the only operation the core performs.
#[derive(Debug, Clone)]
pub struct SymbolUniverse {
    symbols: HashSet<String>,
}

impl SymbolUniverse {
    /// Built-in curated universe.
    pub fn default_universe() -> Self {
        Self::from_symbols(DEFAULT_SYMBOLS.iter().copied())
    }

    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            symbols: symbols
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Load a universe from a file with one symbol per line. Blank lines and
    /// `#` comments are skipped.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrendError> {
        let contents = std::fs::read_to_string(path)?;
        let universe = Self::from_symbols(
            contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        );
        if universe.is_empty() {
            return Err(TrendError::InvalidData(
                "symbol file contained no symbols".to_string(),
            ));
        }
        Ok(universe)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_universe_has_forum_names() {
        let universe = SymbolUniverse::default_universe();
        assert!(universe.contains("GME"));
        assert!(universe.contains("AMC"));
        assert!(universe.contains("TSLA"));
        assert!(!universe.contains("NOTREAL"));
    }

    #[test]
    fn test_from_symbols_normalizes() {
        let universe = SymbolUniverse::from_symbols(["gme", " amc ", ""]);
        assert_eq!(universe.len(), 2);
        assert!(universe.contains("GME"));
        assert!(universe.contains("AMC"));
    }
}
