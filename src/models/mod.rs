//! Data models for techscan.

mod counts;
mod query;

pub use counts::{RunStats, YearCounter, YearlyCounts};
pub use query::{SearchQuery, SearchResultPage};
