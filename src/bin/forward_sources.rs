//! Standalone forward source aggregator - builds the frequency report.

use clap::Parser;
use std::path::PathBuf;

use forward_tracker::commands::sources::{self, SourcesOptions};

#[derive(Parser)]
#[command(name = "forward_sources")]
#[command(about = "Aggregate forward sources from channel logs")]
struct Cli {
    /// Never connect to Telegram; skip channels without a log
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Aggregate every file in the logs directory instead of the
    /// configured channel list
    #[arg(long, default_value_t = false)]
    from_logs: bool,

    /// Report file path (default from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also export the report as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Number of top sources to display
    #[arg(short, long, default_value = "20")]
    top: usize,

    /// Maximum messages to scan per live-scraped channel
    #[arg(short, long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let report = sources::run(SourcesOptions {
        offline: cli.offline,
        from_logs: cli.from_logs,
        output: cli.output,
        csv: cli.csv,
        limit: cli.limit,
    })
    .await?;

    sources::print_top(&report, cli.top);
    Ok(())
}
