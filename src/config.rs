//! Runtime settings and startup validation.

use std::path::PathBuf;
use std::time::Duration;

use crate::search::RetryPolicy;

/// Default search endpoint (Bing Web Search v7).
pub const DEFAULT_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

/// Results requested per search page; pagination offsets advance by this.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Full query retries before a keyword is skipped for the year.
pub const DEFAULT_QUERY_RETRY_LIMIT: u32 = 3;

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Search API subscription key.
    pub api_key: String,
    /// Search API endpoint.
    pub endpoint: String,
    /// Market locale passed to the search API.
    pub market: String,
    /// Results per search page.
    pub page_size: usize,
    /// Output root; the company directory is created beneath it.
    pub data_dir: PathBuf,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Settle time after navigation before text extraction.
    pub render_wait: Duration,
    /// Retry schedule for search API calls.
    pub retry: RetryPolicy,
    /// Full query retries before a keyword is skipped.
    pub query_retry_limit: u32,
}

impl Settings {
    /// Default settings for the given credential and output root.
    pub fn new(api_key: String, data_dir: PathBuf) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            market: "en-US".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            data_dir,
            user_agent: "techscan/0.1 (research)".to_string(),
            request_timeout: Duration::from_secs(30),
            render_wait: Duration::from_secs(3),
            retry: RetryPolicy::default(),
            query_retry_limit: DEFAULT_QUERY_RETRY_LIMIT,
        }
    }
}

/// Errors that abort a run before any remote call is made.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no search API key; set TECHSCAN_API_KEY or pass --api-key")]
    MissingApiKey,

    #[error("invalid year range: {start}..{end}")]
    InvalidYearRange { start: i32, end: i32 },
}

/// Validate the requested year range.
pub fn validate_year_range(start: i32, end: i32) -> Result<(), ConfigError> {
    if start > end {
        return Err(ConfigError::InvalidYearRange { start, end });
    }
    Ok(())
}
