//! Plain HTTP fetcher (no client-side rendering).
//!
//! Fallback used when the `browser` feature is disabled or a run opts out
//! of rendering. Pages that populate their text with scripts will come
//! back mostly empty here.

use async_trait::async_trait;
use tracing::debug;

use super::{visible_text, FetchError, PageFetcher};
use crate::config::Settings;

/// Fetcher that downloads page HTML over HTTP without rendering it.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher from the run settings.
    pub fn new(settings: &Settings) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.request_timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn extract_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;
        Ok(visible_text(&html))
    }
}
