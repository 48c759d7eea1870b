//! The retrieval-and-aggregation pipeline.

mod aggregator;

pub use aggregator::{DedupScope, PipelineEvent, YearlyAggregator};
