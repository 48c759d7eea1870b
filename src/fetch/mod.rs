//! Page fetching and visible-text extraction.

#[cfg(feature = "browser")]
mod browser;
mod http;
mod text;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use text::visible_text;

use async_trait::async_trait;

/// Errors from fetching or rendering a single page.
///
/// These are never fatal to a run: the URL is skipped and the pipeline
/// moves on.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("page load timed out: {0}")]
    Timeout(String),
}

/// Fetches a page and returns its normalized visible text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return lowercased visible text with element
    /// boundaries collapsed to single spaces.
    async fn extract_text(&self, url: &str) -> Result<String, FetchError>;

    /// Release any persistent resources held by the fetcher.
    async fn close(&self) -> Result<(), FetchError> {
        Ok(())
    }
}
