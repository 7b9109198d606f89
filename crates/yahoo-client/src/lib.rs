//! Market metadata enrichment. Fetches per-ticker quotes from Yahoo Finance
//! and joins them onto the ranked score table; quotes are best-effort, the
//! score table is already final by the time this runs.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use trend_core::{EnrichedRow, QuoteProvider, TickerMetadata, TickerRow, TrendError};

const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse", default)]
    quote_response: Option<QuoteBody>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<serde_json::Value>,
}

/// Pull the fields we render out of one raw quote object.
fn metadata_from_quote(symbol: &str, quote: &serde_json::Value) -> TickerMetadata {
    TickerMetadata {
        symbol: symbol.to_string(),
        name: quote
            .get("longName")
            .or_else(|| quote.get("shortName"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        price: quote.get("regularMarketPrice").and_then(|v| v.as_f64()),
        change_pct: quote
            .get("regularMarketChangePercent")
            .and_then(|v| v.as_f64()),
        volume: quote.get("regularMarketVolume").and_then(|v| v.as_i64()),
        avg_volume_3m: quote
            .get("averageDailyVolume3Month")
            .and_then(|v| v.as_i64()),
        market_cap: quote.get("marketCap").and_then(|v| v.as_f64()),
        ..Default::default()
    }
}

/// Drop enriched rows whose fetched price exceeds the cap. Rows without a
/// price survive; the cap only applies where a price is known.
pub fn apply_max_price(rows: Vec<EnrichedRow>, max_price: f64) -> Vec<EnrichedRow> {
    rows.into_iter()
        .filter(|r| {
            r.meta
                .as_ref()
                .and_then(|m| m.price)
                .map_or(true, |p| p <= max_price)
        })
        .collect()
}

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; trendwatch)")
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<TickerMetadata, TrendError> {
        let response = self
            .client
            .get(QUOTE_URL)
            .query(&[("symbols", symbol)])
            .send()
            .await
            .map_err(|e| TrendError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TrendError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let envelope: QuoteEnvelope = response
            .json()
            .await
            .map_err(|e| TrendError::ApiError(e.to_string()))?;

        let result = envelope
            .quote_response
            .unwrap_or_default()
            .result
            .into_iter()
            .next()
            .ok_or_else(|| TrendError::ApiError(format!("No quote returned for {}", symbol)))?;

        Ok(metadata_from_quote(symbol, &result))
    }

    /// Fill in the advanced-mode extras from the quoteSummary endpoint.
    /// Failures here degrade to missing fields rather than failing the quote.
    async fn fetch_advanced(&self, symbol: &str, meta: &mut TickerMetadata) {
        let url = format!("{}/{}", SUMMARY_URL, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", "summaryProfile,defaultKeyStatistics")])
            .send()
            .await;

        let body: serde_json::Value = match response {
            Ok(r) if r.status().is_success() => match r.json().await {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!("{}: advanced stats unparsable: {}", symbol, e);
                    return;
                }
            },
            Ok(r) => {
                tracing::debug!("{}: advanced stats HTTP {}", symbol, r.status());
                return;
            }
            Err(e) => {
                tracing::debug!("{}: advanced stats unavailable: {}", symbol, e);
                return;
            }
        };

        let result = body
            .pointer("/quoteSummary/result/0")
            .cloned()
            .unwrap_or_default();

        meta.industry = result
            .pointer("/summaryProfile/industry")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        meta.float_shares = result
            .pointer("/defaultKeyStatistics/floatShares/raw")
            .and_then(|v| v.as_i64());
        meta.short_percent_float = result
            .pointer("/defaultKeyStatistics/shortPercentOfFloat/raw")
            .and_then(|v| v.as_f64());
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for YahooClient {
    async fn quote(&self, symbol: &str, advanced: bool) -> Result<TickerMetadata, TrendError> {
        let mut meta = self.fetch_quote(symbol).await?;
        if advanced {
            self.fetch_advanced(symbol, &mut meta).await;
        }
        Ok(meta)
    }
}

/// Join market metadata onto the ranked rows with a bounded number of
/// concurrent quote fetches. A failed quote logs a warning and leaves that
/// row's metadata empty; a panicked task fails the whole run.
pub async fn enrich_rows(
    provider: Arc<dyn QuoteProvider>,
    rows: Vec<TickerRow>,
    concurrency: usize,
    advanced: bool,
) -> Result<Vec<EnrichedRow>, TrendError> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(rows.len());

    for row in rows {
        let provider = Arc::clone(&provider);
        let semaphore = Arc::clone(&semaphore);

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let meta = match provider.quote(&row.ticker, advanced).await {
                Ok(meta) => Some(meta),
                Err(e) => {
                    tracing::warn!("{}: quote fetch failed: {}", row.ticker, e);
                    None
                }
            };
            EnrichedRow { row, meta }
        }));
    }

    let mut enriched = Vec::with_capacity(handles.len());
    for handle in handles {
        let row = handle
            .await
            .map_err(|e| TrendError::TaskFailed(e.to_string()))?;
        enriched.push(row);
    }
    Ok(enriched)
}
