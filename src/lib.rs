//! techscan - company technology-keyword presence scanner.
//!
//! Issues year-scoped search queries for a fixed technology vocabulary,
//! renders and extracts the resulting pages, counts keyword occurrences,
//! and aggregates per-year totals into a CSV report.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod storage;
