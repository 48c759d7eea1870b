//! Year-by-year query, extraction and counting loop.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::analysis::count_keywords;
use crate::fetch::PageFetcher;
use crate::models::{RunStats, SearchQuery, SearchResultPage, YearCounter, YearlyCounts};
use crate::search::{RetryingClient, SearchError};
use crate::storage::CompanyStore;

/// Scope of URL deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DedupScope {
    /// One visited set for the whole run; a page's counts are attributed
    /// only to the first year that finds it.
    #[default]
    Run,
    /// Reset the visited set at each year boundary, so a page can count
    /// once per year.
    Year,
}

/// Progress notifications emitted while the pipeline runs.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    YearStarted { year: i32 },
    KeywordStarted { year: i32, keyword: String },
    KeywordCompleted { year: i32, keyword: String },
    PageProcessed { url: String },
    QueryFailed { year: i32, keyword: String },
    YearCompleted { year: i32 },
}

/// Drives the per-year, per-keyword query loop and accumulates counts.
///
/// Years are processed strictly ascending, keywords in vocabulary order,
/// result pages in ascending offset order. All remote calls are awaited
/// in sequence; the visited set and statistics are plain owned state.
pub struct YearlyAggregator {
    client: RetryingClient,
    fetcher: Arc<dyn PageFetcher>,
    store: CompanyStore,
    vocabulary: Vec<String>,
    site: Option<String>,
    page_size: usize,
    query_retry_limit: u32,
    dedup_scope: DedupScope,
    visited: HashSet<String>,
    stats: RunStats,
    events: Option<mpsc::Sender<PipelineEvent>>,
}

impl YearlyAggregator {
    /// Create an aggregator over a search client, fetcher and store.
    pub fn new(
        client: RetryingClient,
        fetcher: Arc<dyn PageFetcher>,
        store: CompanyStore,
        vocabulary: Vec<String>,
    ) -> Self {
        Self {
            client,
            fetcher,
            store,
            vocabulary,
            site: None,
            page_size: crate::config::DEFAULT_PAGE_SIZE,
            query_retry_limit: crate::config::DEFAULT_QUERY_RETRY_LIMIT,
            dedup_scope: DedupScope::default(),
            visited: HashSet::new(),
            stats: RunStats::default(),
            events: None,
        }
    }

    /// Restrict searches to one site domain.
    pub fn with_site(mut self, site: Option<String>) -> Self {
        self.site = site;
        self
    }

    /// Set the results-per-page step used for pagination offsets.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set how many full query retries happen before a keyword is skipped.
    pub fn with_query_retry_limit(mut self, limit: u32) -> Self {
        self.query_retry_limit = limit.max(1);
        self
    }

    /// Set the URL deduplication scope.
    pub fn with_dedup_scope(mut self, scope: DedupScope) -> Self {
        self.dedup_scope = scope;
        self
    }

    /// Attach a progress event channel.
    pub fn with_events(mut self, events: mpsc::Sender<PipelineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Run the pipeline over the inclusive year range.
    ///
    /// Returns exactly one `(year, counter)` entry per year, ascending.
    /// Failed queries and unfetchable pages are recorded and skipped; an
    /// I/O failure writing the raw text store aborts the run.
    pub async fn run(&mut self, start_year: i32, end_year: i32) -> anyhow::Result<YearlyCounts> {
        let mut results = YearlyCounts::new();

        for year in start_year..=end_year {
            if self.dedup_scope == DedupScope::Year {
                self.visited.clear();
            }
            self.emit(PipelineEvent::YearStarted { year }).await;
            info!("Processing year {}", year);

            let mut counter = YearCounter::zeroed(&self.vocabulary);
            let vocabulary = self.vocabulary.clone();
            for keyword in &vocabulary {
                self.emit(PipelineEvent::KeywordStarted {
                    year,
                    keyword: keyword.clone(),
                })
                .await;

                self.run_keyword(year, keyword, &mut counter).await?;

                self.emit(PipelineEvent::KeywordCompleted {
                    year,
                    keyword: keyword.clone(),
                })
                .await;
            }

            results.push((year, counter));
            self.emit(PipelineEvent::YearCompleted { year }).await;
        }

        Ok(results)
    }

    /// Walk one keyword's result pages for one year.
    async fn run_keyword(
        &mut self,
        year: i32,
        keyword: &str,
        counter: &mut YearCounter,
    ) -> anyhow::Result<()> {
        let mut offset = 0;

        loop {
            let query = SearchQuery::new(keyword, self.site.as_deref(), year, offset);

            let page = match self.fetch_page(&query).await {
                Ok(page) => page,
                Err(error) => {
                    warn!("Giving up on \"{}\" for {}: {}", keyword, year, error);
                    self.stats.queries_failed += 1;
                    self.emit(PipelineEvent::QueryFailed {
                        year,
                        keyword: keyword.to_string(),
                    })
                    .await;
                    return Ok(());
                }
            };
            self.stats.api_requests += 1;

            if page.is_exhausted() {
                debug!(
                    "\"{}\" exhausted for {} at offset {}",
                    keyword, year, offset
                );
                return Ok(());
            }

            for url in &page.urls {
                if self.visited.contains(url) {
                    self.stats.pages_skipped += 1;
                    continue;
                }
                self.visited.insert(url.clone());

                let text = match self.fetcher.extract_text(url).await {
                    Ok(text) => text,
                    Err(error) => {
                        warn!("Skipping {}: {}", url, error);
                        self.stats.extraction_failures += 1;
                        continue;
                    }
                };

                counter.merge(&count_keywords(&text, &self.vocabulary));
                self.store.append_page_text(year, &text)?;
                self.stats.pages_processed += 1;
                self.emit(PipelineEvent::PageProcessed { url: url.clone() })
                    .await;
            }

            // Offsets advance by the page size regardless of how many
            // results the page actually carried.
            offset += self.page_size;
        }
    }

    /// Issue a query with a bounded number of full retry cycles.
    async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchResultPage, SearchError> {
        let mut last_error = None;

        for cycle in 0..self.query_retry_limit {
            match self.client.fetch(query).await {
                Ok(page) => return Ok(page),
                Err(error) => {
                    warn!(
                        "Query cycle {}/{} failed for \"{}\": {}",
                        cycle + 1,
                        self.query_retry_limit,
                        query.keyword,
                        error
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or(SearchError::Unavailable {
            attempts: 0,
            last_error: "no attempts made".to_string(),
        }))
    }

    async fn emit(&self, event: PipelineEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::fetch::FetchError;
    use crate::search::{RetryPolicy, SearchProvider};

    /// Serves canned result pages keyed by (year, offset).
    struct StubProvider {
        pages: HashMap<(i32, usize), Vec<String>>,
        requests: AtomicU64,
    }

    impl StubProvider {
        fn new(pages: HashMap<(i32, usize), Vec<String>>) -> Self {
            Self {
                pages,
                requests: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, SearchError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let urls = self
                .pages
                .get(&(query.year, query.offset))
                .cloned()
                .unwrap_or_default();
            Ok(SearchResultPage { urls })
        }
    }

    /// Returns fixed text for every URL and records what was fetched.
    struct StubFetcher {
        text: String,
        fetched: Mutex<Vec<String>>,
        fail: bool,
    }

    impl StubFetcher {
        fn returning(text: &str) -> Self {
            Self {
                text: text.to_string(),
                fetched: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                text: String::new(),
                fetched: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn extract_text(&self, url: &str) -> Result<String, FetchError> {
            if self.fail {
                return Err(FetchError::Browser("render failed".to_string()));
            }
            self.fetched.lock().unwrap().push(url.to_string());
            Ok(self.text.clone())
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_millis(2),
        }
    }

    fn aggregator(
        provider: Arc<StubProvider>,
        fetcher: Arc<StubFetcher>,
        vocabulary: &[&str],
    ) -> (YearlyAggregator, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CompanyStore::new(dir.path(), "Acme");
        store.ensure_directories().unwrap();
        let client = RetryingClient::new(provider, fast_policy());
        let vocabulary = vocabulary.iter().map(|k| k.to_string()).collect();
        (
            YearlyAggregator::new(client, fetcher, store, vocabulary),
            dir,
        )
    }

    #[tokio::test]
    async fn pagination_stops_on_empty_page() {
        // Results at offsets 0 and 50; offset 100 is empty.
        let mut pages = HashMap::new();
        pages.insert(
            (2020, 0),
            vec!["https://x/1".to_string(), "https://x/2".to_string()],
        );
        pages.insert((2020, 50), vec!["https://x/3".to_string()]);

        let provider = Arc::new(StubProvider::new(pages));
        let fetcher = Arc::new(StubFetcher::returning("alpha"));
        let (mut aggregator, _dir) = aggregator(provider.clone(), fetcher, &["alpha"]);

        aggregator.run(2020, 2020).await.unwrap();

        assert_eq!(provider.requests.load(Ordering::SeqCst), 3);
        assert_eq!(aggregator.stats().api_requests, 3);
        assert_eq!(aggregator.stats().pages_processed, 3);
    }

    #[tokio::test]
    async fn duplicate_urls_count_once_within_a_year() {
        // Both keywords surface the same URL.
        let mut pages = HashMap::new();
        pages.insert((2020, 0), vec!["https://x/shared".to_string()]);

        let provider = Arc::new(StubProvider::new(pages));
        let fetcher = Arc::new(StubFetcher::returning("alpha beta alpha"));
        let (mut aggregator, _dir) =
            aggregator(provider, fetcher.clone(), &["alpha", "beta"]);

        let results = aggregator.run(2020, 2020).await.unwrap();

        // The second keyword's query returns the same URL; it is skipped.
        assert_eq!(fetcher.fetched.lock().unwrap().len(), 1);
        assert_eq!(aggregator.stats().pages_skipped, 1);

        let (_, counter) = &results[0];
        assert_eq!(counter.get("alpha"), 2);
        assert_eq!(counter.get("beta"), 1);
    }

    #[tokio::test]
    async fn extraction_failure_skips_url_and_continues() {
        let mut pages = HashMap::new();
        pages.insert((2020, 0), vec!["https://x/broken".to_string()]);

        let provider = Arc::new(StubProvider::new(pages));
        let fetcher = Arc::new(StubFetcher::failing());
        let (mut aggregator, _dir) = aggregator(provider, fetcher, &["alpha"]);

        let results = aggregator.run(2020, 2020).await.unwrap();

        assert_eq!(aggregator.stats().extraction_failures, 1);
        assert_eq!(aggregator.stats().pages_processed, 0);
        let (_, counter) = &results[0];
        assert_eq!(counter.get("alpha"), 0);
    }

    #[tokio::test]
    async fn raw_text_is_persisted_per_year() {
        let mut pages = HashMap::new();
        pages.insert((2020, 0), vec!["https://x/1".to_string()]);

        let provider = Arc::new(StubProvider::new(pages));
        let fetcher = Arc::new(StubFetcher::returning("alpha text"));
        let (mut aggregator, dir) = aggregator(provider, fetcher, &["alpha"]);

        aggregator.run(2020, 2020).await.unwrap();

        let path = dir.path().join("Acme").join("webpage_content_2020.txt");
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "alpha text\n");
    }

    /// Always fails; used to exercise the keyword-skip path.
    struct DownProvider {
        requests: AtomicU64,
    }

    #[async_trait]
    impl SearchProvider for DownProvider {
        async fn search(&self, _query: &SearchQuery) -> Result<SearchResultPage, SearchError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Err(SearchError::Decode(
                serde_json::from_str::<serde_json::Value>("bad").unwrap_err(),
            ))
        }
    }

    #[tokio::test]
    async fn unavailable_api_skips_keyword_but_year_completes() {
        let provider = Arc::new(DownProvider {
            requests: AtomicU64::new(0),
        });
        let dir = tempfile::tempdir().unwrap();
        let store = CompanyStore::new(dir.path(), "Acme");
        store.ensure_directories().unwrap();
        let client = RetryingClient::new(provider.clone(), fast_policy());
        let fetcher = Arc::new(StubFetcher::returning("alpha"));

        let mut aggregator = YearlyAggregator::new(
            client,
            fetcher,
            store,
            vec!["alpha".to_string(), "beta".to_string()],
        )
        .with_query_retry_limit(2);

        let results = aggregator.run(2020, 2020).await.unwrap();

        // Both keywords skipped, year entry still emitted with zeroes.
        assert_eq!(results.len(), 1);
        assert_eq!(aggregator.stats().queries_failed, 2);
        let (_, counter) = &results[0];
        assert_eq!(counter.get("alpha"), 0);
        assert_eq!(counter.get("beta"), 0);
        // 2 keywords x 2 outer cycles x 2 inner attempts.
        assert_eq!(provider.requests.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn per_year_dedup_scope_resets_between_years() {
        let mut pages = HashMap::new();
        pages.insert((2020, 0), vec!["https://x/1".to_string()]);
        pages.insert((2021, 0), vec!["https://x/1".to_string()]);

        let provider = Arc::new(StubProvider::new(pages));
        let fetcher = Arc::new(StubFetcher::returning("alpha"));
        let (aggregator, _dir) = aggregator(provider, fetcher.clone(), &["alpha"]);
        let mut aggregator = aggregator.with_dedup_scope(DedupScope::Year);

        let results = aggregator.run(2020, 2021).await.unwrap();

        assert_eq!(fetcher.fetched.lock().unwrap().len(), 2);
        assert_eq!(results[0].1.get("alpha"), 1);
        assert_eq!(results[1].1.get("alpha"), 1);
    }
}
