//! techscan - company technology-keyword presence scanner.
//!
//! A tool for collecting web pages relevant to a company over a range of
//! years and counting technology keyword occurrences per year.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if techscan::cli::is_verbose() {
        "techscan=info"
    } else {
        "techscan=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    techscan::cli::run().await
}
