//! Search provider interface and retrying client.

mod bing;
mod retry;

pub use bing::BingSearchProvider;
pub use retry::{RetryPolicy, RetryingClient};

use async_trait::async_trait;

use crate::models::{SearchQuery, SearchResultPage};

/// Errors from the search API.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Transport failure; retried by the client.
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed response body; retried by the client.
    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The retry schedule was exhausted; fatal to the current query.
    #[error("search API unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },
}

/// A remote search API answering one paginated query at a time.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Issue a single search request.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, SearchError>;
}
