use crate::{Post, TickerMetadata, TimeWindow, TrendError};
use async_trait::async_trait;

/// Source of submissions for one time window. Implementations own paging,
/// retries, and rate limiting; exhaustion of the returned vec is the end of
/// the window.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_window(
        &self,
        window: &TimeWindow,
        subreddit: Option<&str>,
    ) -> Result<Vec<Post>, TrendError>;
}

/// Source of live market metadata for a single symbol.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn quote(&self, symbol: &str, advanced: bool) -> Result<TickerMetadata, TrendError>;
}
