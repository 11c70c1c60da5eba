//! Page fetching.
//!
//! One HTTP GET per work item, 30 second timeout, no retries. A
//! failed fetch skips the item; it never aborts the batch.

use crate::error::{Result, WatchError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Trait for page fetchers (to allow mocking).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Production fetcher backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        // Browser-like User-Agent to avoid trivial bot detection
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .parse()
                .expect("static header value"),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.5".parse().expect("static header value"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| WatchError::Fetch {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WatchError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        response.text().await.map_err(|e| WatchError::Fetch {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })
    }
}
