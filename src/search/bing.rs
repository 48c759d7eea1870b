//! Bing Web Search v7 provider.
//!
//! Encodes a [`SearchQuery`] as the provider's request parameters and
//! decodes the `webPages` container from the response. A response with no
//! such container means the query is exhausted, not an error.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{SearchError, SearchProvider};
use crate::config::Settings;
use crate::models::{SearchQuery, SearchResultPage};

/// Subscription key header required by the API.
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Search provider backed by the Bing Web Search v7 API.
pub struct BingSearchProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    market: String,
    page_size: usize,
}

impl BingSearchProvider {
    /// Create a provider from the run settings.
    pub fn new(settings: &Settings) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.request_timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            market: settings.market.clone(),
            page_size: settings.page_size,
        }
    }

    /// Request parameters for one query.
    fn query_params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        vec![
            ("q", query.query_string()),
            ("count", self.page_size.to_string()),
            ("offset", query.offset.to_string()),
            ("mkt", self.market.clone()),
            ("freshness", query.freshness_range()),
        ]
    }
}

/// Response envelope; `webPages` is absent once results are exhausted.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<WebPage>,
}

#[derive(Debug, Deserialize)]
struct WebPage {
    url: String,
}

#[async_trait]
impl SearchProvider for BingSearchProvider {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, SearchError> {
        debug!(
            "Searching {} at offset {}",
            query.query_string(),
            query.offset
        );

        let response = self
            .client
            .get(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .query(&self.query_params(query))
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let decoded: SearchResponse = serde_json::from_str(&body)?;

        let urls: Vec<String> = decoded
            .web_pages
            .map(|pages| pages.value.into_iter().map(|page| page.url).collect())
            .unwrap_or_default();

        debug!("Search returned {} urls", urls.len());

        Ok(SearchResultPage { urls })
    }
}
