//! The `run` command: wire the pipeline together and emit the report.

use std::path::PathBuf;
use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::analysis::default_vocabulary;
use crate::config::{validate_year_range, ConfigError, Settings};
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::pipeline::{DedupScope, PipelineEvent, YearlyAggregator};
use crate::report::write_counts_csv;
use crate::search::{BingSearchProvider, RetryingClient};
use crate::storage::CompanyStore;

/// Arguments for one scan.
pub struct RunArgs {
    pub company: String,
    pub start_year: i32,
    pub end_year: i32,
    pub site: Option<String>,
    pub api_key: Option<String>,
    pub dedup_scope: DedupScope,
    pub no_browser: bool,
    pub data_dir: PathBuf,
}

/// Scan a company's web presence and write the summary CSV.
pub async fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    // Startup validation, before any remote call
    validate_year_range(args.start_year, args.end_year)?;
    let api_key = args.api_key.ok_or(ConfigError::MissingApiKey)?;
    let settings = Settings::new(api_key, args.data_dir);

    let site = args.site.as_deref().map(normalize_site);
    let vocabulary = default_vocabulary();

    let store = CompanyStore::new(&settings.data_dir, &args.company);
    store.ensure_directories()?;

    let provider = Arc::new(BingSearchProvider::new(&settings));
    let client = RetryingClient::new(provider, settings.retry.clone());
    let fetcher = build_fetcher(&settings, args.no_browser).await?;

    let years = (args.end_year - args.start_year + 1) as u64;
    println!(
        "{} Scanning {} over {} year(s), {} keywords",
        style("→").cyan(),
        args.company,
        years,
        vocabulary.len()
    );

    // Progress bar driven by pipeline events (UI concern)
    let pb = ProgressBar::new(years * vocabulary.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(100);
    let progress = pb.clone();
    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                PipelineEvent::KeywordStarted { year, keyword } => {
                    progress.set_message(format!("{} \"{}\"", year, keyword));
                }
                PipelineEvent::KeywordCompleted { .. } => progress.inc(1),
                _ => {}
            }
        }
    });

    let mut aggregator = YearlyAggregator::new(client, fetcher.clone(), store.clone(), vocabulary)
        .with_site(site)
        .with_page_size(settings.page_size)
        .with_query_retry_limit(settings.query_retry_limit)
        .with_dedup_scope(args.dedup_scope)
        .with_events(event_tx);

    let outcome = aggregator.run(args.start_year, args.end_year).await;

    // The rendering resource goes away on every exit path
    if let Err(error) = fetcher.close().await {
        tracing::warn!("Failed to close fetcher: {}", error);
    }

    let stats = aggregator.stats().clone();
    drop(aggregator);
    pb.finish_and_clear();
    let _ = event_handler.await;

    let results = outcome?;

    // The summary is only written once all years completed
    let csv_path = store.counts_csv_path();
    write_counts_csv(&csv_path, &results)?;

    println!(
        "{} Processed {} pages ({} duplicates skipped, {} extraction failures)",
        style("✓").green(),
        stats.pages_processed,
        stats.pages_skipped,
        stats.extraction_failures
    );
    if stats.queries_failed > 0 {
        println!(
            "{} {} queries abandoned after retries",
            style("!").yellow(),
            stats.queries_failed
        );
    }
    println!(
        "{} Total API requests: {}",
        style("→").cyan(),
        stats.api_requests
    );
    println!(
        "{} Report written to {}",
        style("→").cyan(),
        csv_path.display()
    );

    Ok(())
}

/// Accept either a bare domain or a full URL for the site restriction.
fn normalize_site(input: &str) -> String {
    if input.starts_with("http") {
        url::Url::parse(input)
            .ok()
            .and_then(|u| u.host_str().map(|s| s.to_string()))
            .unwrap_or_else(|| input.to_string())
    } else {
        input.to_string()
    }
}

#[cfg(feature = "browser")]
async fn build_fetcher(
    settings: &Settings,
    no_browser: bool,
) -> anyhow::Result<Arc<dyn PageFetcher>> {
    if no_browser {
        Ok(Arc::new(HttpFetcher::new(settings)))
    } else {
        Ok(Arc::new(crate::fetch::BrowserFetcher::launch(settings).await?))
    }
}

#[cfg(not(feature = "browser"))]
async fn build_fetcher(
    settings: &Settings,
    no_browser: bool,
) -> anyhow::Result<Arc<dyn PageFetcher>> {
    if !no_browser {
        tracing::warn!("Built without browser support; fetching with plain HTTP");
    }
    Ok(Arc::new(HttpFetcher::new(settings)))
}
