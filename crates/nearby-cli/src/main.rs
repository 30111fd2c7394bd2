mod search;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nearby")]
#[command(about = "Rank facilities within a radius of a reference point")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the reference points available to search from
    References,
    /// Rank facilities around one reference point
    Search(SearchArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct SearchArgs {
    /// Reference point name, exactly as it appears in the references file
    #[arg(long)]
    reference: String,
    /// Search radius in miles (defaults to `NEARBY_DEFAULT_RADIUS_MILES`)
    #[arg(long)]
    radius: Option<f64>,
    /// Refine the ranking with driving distances from the routing service
    #[arg(long)]
    driving: bool,
    /// Facility to highlight in the output
    #[arg(long)]
    select: Option<String>,
    /// Directory to write the ranked list to as CSV
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = nearby_core::load_app_config().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::References) => search::list_references(&config),
        Some(Commands::Search(args)) => search::run_search(&config, args).await,
        None => {
            println!("nearby: use `nearby search --reference <NAME>` or `nearby references`");
            Ok(())
        }
    }
}
