//! Bounded retry with exponential backoff for search API calls.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::{SearchError, SearchProvider};
use crate::models::{SearchQuery, SearchResultPage};

/// Retry schedule: bounded attempts with exponentially increasing delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: f64,
    /// Ceiling on the per-attempt delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            base_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the given zero-based failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt as i32);
        self.base_delay.mul_f64(factor).min(self.max_delay)
    }
}

/// Wraps a search provider with the retry schedule.
///
/// Transport and decode failures are retried; exhausting the schedule
/// surfaces [`SearchError::Unavailable`] to the caller, which decides
/// whether to skip the current keyword or retry the whole query.
#[derive(Clone)]
pub struct RetryingClient {
    provider: Arc<dyn SearchProvider>,
    policy: RetryPolicy,
}

impl RetryingClient {
    /// Create a client over a provider with the given schedule.
    pub fn new(provider: Arc<dyn SearchProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Issue a query, retrying per the schedule.
    pub async fn fetch(&self, query: &SearchQuery) -> Result<SearchResultPage, SearchError> {
        let mut last_error = String::from("no attempts made");

        for attempt in 0..self.policy.max_attempts {
            match self.provider.search(query).await {
                Ok(page) => return Ok(page),
                Err(error) => {
                    last_error = error.to_string();
                    if attempt + 1 < self.policy.max_attempts {
                        let delay = self.policy.delay_for(attempt);
                        warn!(
                            "Search attempt {}/{} failed ({}), retrying in {:?}",
                            attempt + 1,
                            self.policy.max_attempts,
                            error,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(SearchError::Unavailable {
            attempts: self.policy.max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `fail_first` calls, then succeeds.
    struct FlakyProvider {
        fail_first: u32,
        calls: AtomicU32,
    }

    impl FlakyProvider {
        fn new(fail_first: u32) -> Self {
            Self {
                fail_first,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for FlakyProvider {
        async fn search(&self, _query: &SearchQuery) -> Result<SearchResultPage, SearchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                Err(SearchError::Decode(
                    serde_json::from_str::<serde_json::Value>("not json").unwrap_err(),
                ))
            } else {
                Ok(SearchResultPage {
                    urls: vec!["https://example.com/hit".to_string()],
                })
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_millis(8),
        }
    }

    #[test]
    fn delays_never_decrease() {
        let policy = RetryPolicy::default();
        let mut previous = Duration::ZERO;
        for attempt in 0..20 {
            let delay = policy.delay_for(attempt);
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn delay_doubles_until_the_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
        assert_eq!(policy.delay_for(19), policy.max_delay);
    }

    #[tokio::test]
    async fn recovers_after_transient_faults() {
        let provider = Arc::new(FlakyProvider::new(3));
        let client = RetryingClient::new(provider.clone(), fast_policy(20));
        let query = SearchQuery::new("alpha", None, 2020, 0);

        let page = client.fetch(&query).await.unwrap();
        assert_eq!(page.urls.len(), 1);
        // 3 failures then the successful call: exactly 3 retries performed.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn surfaces_unavailable_after_exhausting_attempts() {
        let provider = Arc::new(FlakyProvider::new(u32::MAX));
        let client = RetryingClient::new(provider.clone(), fast_policy(5));
        let query = SearchQuery::new("alpha", None, 2020, 0);

        let error = client.fetch(&query).await.unwrap_err();
        match error {
            SearchError::Unavailable { attempts, .. } => assert_eq!(attempts, 5),
            other => panic!("expected Unavailable, got {other}"),
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 5);
    }
}
