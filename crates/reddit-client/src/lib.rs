//! Pushshift-style submission search client. Owns paging, rate limiting,
//! retries, and optional proxy rotation; hands the core plain
//! `Post { text, score }` values.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use trend_core::{Post, PostSource, TimeWindow, TrendError};

const BASE_URL: &str = "https://api.pushshift.io";
const PAGE_SIZE: usize = 100;
/// Hard cap on pages per window so a stuck cursor cannot loop forever.
const MAX_PAGES: usize = 500;

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Remove timestamps outside the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            let wait_until = ts.front().unwrap().checked_add(self.window).unwrap();
            let sleep_dur = wait_until.duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for search API slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Raw submission shape as returned by the search API. Only the fields the
/// pipeline reads are deserialized.
#[derive(Debug, Deserialize)]
struct RawSubmission {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    created_utc: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<RawSubmission>,
}

/// Collapse a raw submission to the two fields the core reads. Placeholder
/// bodies left behind by moderation are treated as missing text.
fn adapt_submission(raw: &RawSubmission) -> Post {
    let body = match raw.selftext.as_deref() {
        Some("[removed]") | Some("[deleted]") | None => "",
        Some(text) => text,
    };
    let text = if body.is_empty() {
        raw.title.clone()
    } else {
        format!("{}\n{}", raw.title, body)
    };
    Post::new(text, raw.score)
}

/// Parse a proxy-list file's contents: one `host:port` per line, blank lines
/// and `#` comments skipped.
fn parse_proxy_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct RedditClient {
    /// One HTTP client per proxy, or a single direct client. Page requests
    /// rotate across them round-robin.
    clients: Vec<Client>,
    cursor: Arc<AtomicUsize>,
    rate_limiter: RateLimiter,
}

impl RedditClient {
    pub fn new() -> Self {
        // Pushshift allows roughly 60 req/min for anonymous callers.
        let rate_limit: usize = std::env::var("PUSHSHIFT_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Self {
            clients: vec![Self::build_client(None)],
            cursor: Arc::new(AtomicUsize::new(0)),
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Build a client per proxy from a proxy-list file. Lines that do not
    /// parse as a proxy URL are skipped with a warning; if none survive, the
    /// client falls back to direct requests.
    pub fn with_proxy_file(path: impl AsRef<Path>) -> Result<Self, TrendError> {
        let contents = std::fs::read_to_string(path)?;
        let mut client = Self::new();
        let mut proxied = Vec::new();

        for line in parse_proxy_lines(&contents) {
            let url = if line.contains("://") {
                line.clone()
            } else {
                format!("http://{}", line)
            };
            match reqwest::Proxy::all(&url) {
                Ok(proxy) => proxied.push(Self::build_client(Some(proxy))),
                Err(e) => tracing::warn!("Skipping bad proxy entry {:?}: {}", line, e),
            }
        }

        if proxied.is_empty() {
            tracing::warn!("Proxy file contained no usable proxies; using direct requests");
        } else {
            tracing::info!("Loaded {} proxies", proxied.len());
            client.clients = proxied;
        }
        Ok(client)
    }

    fn build_client(proxy: Option<reqwest::Proxy>) -> Client {
        let mut builder = Client::builder().timeout(Duration::from_secs(30));
        if let Some(proxy) = proxy {
            builder = builder.proxy(proxy);
        }
        builder.build().unwrap_or_else(|_| Client::new())
    }

    fn next_client(&self) -> &Client {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        &self.clients[idx]
    }

    /// Fetch one page of submissions with rate limiting and bounded 429
    /// retries.
    async fn fetch_page(
        &self,
        after: i64,
        before: i64,
        subreddit: Option<&str>,
    ) -> Result<Vec<RawSubmission>, TrendError> {
        let url = format!("{}/reddit/search/submission/", BASE_URL);
        let after_s = after.to_string();
        let before_s = before.to_string();
        let size_s = PAGE_SIZE.to_string();

        let mut query: Vec<(&str, &str)> = vec![
            ("after", &after_s),
            ("before", &before_s),
            ("size", &size_s),
            ("sort", "asc"),
            ("sort_type", "created_utc"),
            ("fields", "title,selftext,score,created_utc"),
        ];
        if let Some(sub) = subreddit {
            query.push(("subreddit", sub));
        }

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let response = self
                .next_client()
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|e| TrendError::ApiError(e.to_string()))?;

            if response.status().as_u16() == 429 {
                let wait_secs = 10u64;
                tracing::warn!(
                    "Search API 429 rate limited, waiting {}s before retry {}/3",
                    wait_secs,
                    attempt + 1
                );
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                continue;
            }

            if !response.status().is_success() {
                return Err(TrendError::ApiError(format!(
                    "HTTP {}: {}",
                    response.status(),
                    response.text().await.unwrap_or_default()
                )));
            }

            let page: SearchResponse = response
                .json()
                .await
                .map_err(|e| TrendError::ApiError(e.to_string()))?;
            return Ok(page.data);
        }

        Err(TrendError::ApiError(
            "Rate limited by search API after 3 retries".to_string(),
        ))
    }

    /// Fetch every submission in the window, paging by shifting the `after`
    /// cursor to the last seen creation time.
    pub async fn fetch_submissions(
        &self,
        window: &TimeWindow,
        subreddit: Option<&str>,
    ) -> Result<Vec<Post>, TrendError> {
        let before = window.before.timestamp();
        let mut after = window.after.timestamp();
        let mut posts = Vec::new();

        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(after, before, subreddit).await?;
            if page.is_empty() {
                break;
            }

            let last_created = page
                .iter()
                .map(|r| r.created_utc as i64)
                .max()
                .unwrap_or(before);
            posts.extend(page.iter().map(adapt_submission));

            if page.len() < PAGE_SIZE || last_created <= after {
                break;
            }
            after = last_created;
        }

        tracing::info!(
            "Fetched {} submissions for window ending {}",
            posts.len(),
            window.before
        );
        Ok(posts)
    }

    /// Fetch the current and previous windows concurrently.
    pub async fn fetch_recent_and_previous(
        &self,
        interval_hours: i64,
        subreddit: Option<&str>,
    ) -> Result<(Vec<Post>, Vec<Post>), TrendError> {
        let now = chrono::Utc::now();
        let (recent_window, previous_window) = TimeWindow::recent_and_previous(interval_hours, now);

        let (recent, previous) = tokio::join!(
            self.fetch_submissions(&recent_window, subreddit),
            self.fetch_submissions(&previous_window, subreddit),
        );
        Ok((recent?, previous?))
    }
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_window(
        &self,
        window: &TimeWindow,
        subreddit: Option<&str>,
    ) -> Result<Vec<Post>, TrendError> {
        self.fetch_submissions(window, subreddit).await
    }
}
