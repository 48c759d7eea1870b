//! CLI parser and dispatch.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::pipeline::DedupScope;

#[derive(Parser)]
#[command(name = "techscan")]
#[command(about = "Company technology-keyword presence scanner")]
#[command(version)]
pub struct Cli {
    /// Output root directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a company's web presence over a range of years
    Run {
        /// Company name
        company: String,
        /// First year to scan
        start_year: i32,
        /// Last year to scan (inclusive)
        end_year: i32,
        /// Restrict the search to one site domain
        #[arg(long)]
        url: Option<String>,
        /// Search API subscription key
        #[arg(long, env = "TECHSCAN_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// URL deduplication scope
        #[arg(long, value_enum, default_value_t = DedupScope::Run)]
        dedup_scope: DedupScope,
        /// Fetch pages with plain HTTP instead of a headless browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Print the keyword vocabulary
    Keywords,
}

/// Parse arguments and dispatch to the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Run {
            company,
            start_year,
            end_year,
            url,
            api_key,
            dedup_scope,
            no_browser,
        } => {
            commands::cmd_run(commands::RunArgs {
                company,
                start_year,
                end_year,
                site: url,
                api_key,
                dedup_scope,
                no_browser,
                data_dir,
            })
            .await
        }
        Commands::Keywords => commands::cmd_keywords(),
    }
}
