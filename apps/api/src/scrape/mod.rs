//! Scraper: fetches one job-posting page and extracts what the markup reliably shows.
//!
//! A scrape is a single GET (no link following) bounded by one timeout; the caller sees
//! either a complete `ScrapedRecord` or a terminal error, never partial state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub mod extract;
pub mod platform;

use crate::scrape::extract::extract_record;
use crate::scrape::platform::Platform;

/// Overall deadline for fetch + extraction.
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(15);

/// Page bytes read before the rest of the body is dropped.
pub const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

/// Desktop Chrome user agent; job boards block obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("scrape failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("scrape failed: {url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("scrape timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("page extraction aborted: {0}")]
    Extract(#[source] tokio::task::JoinError),
}

/// Fields observed directly on the page. Only `platform` is always set; an empty
/// `raw_text` means there is nothing to hand to the LLM.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrapedRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub platform: Platform,
    pub raw_text: String,
}

#[async_trait]
pub trait JobScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapedRecord, ScrapeError>;
}

/// Scraper backed by a plain HTTP fetch and `scraper`'s HTML5 parser.
#[derive(Clone)]
pub struct HttpScraper {
    client: Client,
    timeout: Duration,
}

impl HttpScraper {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(SCRAPE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().user_agent(BROWSER_USER_AGENT).build()?,
            timeout,
        })
    }

    async fn fetch_and_extract(&self, url: &str) -> Result<ScrapedRecord, ScrapeError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ScrapeError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(ScrapeError::Transport)? {
            let room = MAX_PAGE_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                debug!("Page {url} exceeds {MAX_PAGE_BYTES} bytes; truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        // Parsing runs off the async workers so the timeout can abandon it.
        let html = String::from_utf8_lossy(&body).into_owned();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || extract_record(&html, &url))
            .await
            .map_err(ScrapeError::Extract)
    }
}

#[async_trait]
impl JobScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedRecord, ScrapeError> {
        let parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let record = tokio::time::timeout(self.timeout, self.fetch_and_extract(url))
            .await
            .map_err(|_| ScrapeError::Timeout(self.timeout))??;

        info!(
            "Scraped {url}: platform={}, title_found={}, raw_text_chars={}",
            record.platform,
            record.title.is_some(),
            record.raw_text.chars().count()
        );
        Ok(record)
    }
}
