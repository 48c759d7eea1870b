//! Per-year keyword counters and run statistics.

use std::collections::BTreeMap;

/// Aggregated counts for a whole run: one entry per year, ascending.
pub type YearlyCounts = Vec<(i32, YearCounter)>;

/// Keyword occurrence counts for a single year.
///
/// Always holds exactly the vocabulary keys, zero-initialized, so the
/// report carries a row for every keyword even when nothing matched.
/// Counts are only ever incremented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearCounter {
    counts: BTreeMap<String, u64>,
}

impl YearCounter {
    /// Create a counter with every vocabulary keyword at zero.
    pub fn zeroed(vocabulary: &[String]) -> Self {
        let counts = vocabulary.iter().map(|k| (k.clone(), 0)).collect();
        Self { counts }
    }

    /// Add to a keyword's count. Keywords outside the vocabulary are ignored.
    pub fn add(&mut self, keyword: &str, amount: u64) {
        if let Some(count) = self.counts.get_mut(keyword) {
            *count += amount;
        }
    }

    /// Merge a per-page count map into this counter.
    pub fn merge(&mut self, page_counts: &BTreeMap<String, u64>) {
        for (keyword, count) in page_counts {
            self.add(keyword, *count);
        }
    }

    /// Count for a keyword, zero if absent.
    pub fn get(&self, keyword: &str) -> u64 {
        self.counts.get(keyword).copied().unwrap_or(0)
    }

    /// Iterate counts in keyword order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of tracked keywords.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no keywords are tracked.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Totals accumulated over a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Completed search API requests.
    pub api_requests: u64,
    /// Pages fetched, extracted and counted.
    pub pages_processed: u64,
    /// Result URLs skipped as already visited.
    pub pages_skipped: u64,
    /// Pages that failed to fetch or render.
    pub extraction_failures: u64,
    /// Queries abandoned after exhausting retries.
    pub queries_failed: u64,
}
