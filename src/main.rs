//! Forward Tracker CLI - main entry point
//!
//! This is the unified CLI interface for all channel logging and
//! forward source aggregation operations.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use forward_tracker::{commands, metrics, ChannelRef};
use tracing::warn;

#[derive(Parser)]
#[command(name = "forward_tracker")]
#[command(about = "Telegram Forward Source Tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Expose Prometheus metrics on this address (e.g. 127.0.0.1:9184)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log channel history to logs/{channel_id}.json
    Log {
        /// Channel ID or @username; all configured channels when omitted
        channel: Option<String>,

        /// Rewrite logs that already exist
        #[arg(short, long)]
        overwrite: bool,

        /// Maximum number of messages to fetch per channel
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Aggregate forward sources into a frequency report
    Sources {
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
    },

    /// Show a channel's ID and title
    Info {
        /// Channel ID or @username
        channel: String,
    },

    /// Full pipeline: refresh all logs, then build the report
    Run {
        /// Maximum number of messages to fetch per channel
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Initialize a new session (use only once!)
    InitSession,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Log { .. } => "log",
            Commands::Sources { .. } => "sources",
            Commands::Info { .. } => "info",
            Commands::Run { .. } => "run",
            Commands::InitSession => "init_session",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up .env credentials for local runs
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("forward_tracker=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if let Some(raw) = cli.metrics_addr.as_deref() {
        match raw.parse::<SocketAddr>() {
            Ok(addr) => metrics::spawn_metrics_server(addr),
            Err(err) => warn!(addr = raw, "Ignoring unparseable metrics address: {}", err),
        }
    }

    let command = cli.command.name();
    metrics::record_command_start(command);
    let started = Instant::now();

    let result = execute_command(cli.command).await;

    metrics::record_command_result(command, started.elapsed(), result.is_ok());

    result
}

async fn execute_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Log {
            channel,
            overwrite,
            limit,
        } => {
            let target = channel.as_deref().map(ChannelRef::parse);
            let summary = commands::log_channel::run(target, Some(overwrite), limit).await?;
            println!(
                "\n✅ Logged {} channels ({} kept existing, {} unreachable)",
                summary.written, summary.kept, summary.unreachable
            );
        }
        Commands::Sources {
            offline,
            from_logs,
            output,
            csv,
            top,
            limit,
        } => {
            let report = commands::sources::run(commands::sources::SourcesOptions {
                offline,
                from_logs,
                output,
                csv,
                limit,
            })
            .await?;
            commands::sources::print_top(&report, top);
        }
        Commands::Info { channel } => {
            let target = ChannelRef::parse(&channel);
            let info = commands::channel_info::run(&target).await?;
            println!("\n📣 {}", info.title);
            match info.channel_id {
                Some(id) => println!("   ID: {}", id),
                None => println!("   ID: unknown (channel not reachable)"),
            }
        }
        Commands::Run { limit } => {
            let report = commands::run::run(limit).await?;
            commands::sources::print_top(&report, 20);
        }
        Commands::InitSession => {
            commands::init_session::run().await?;
        }
    }

    Ok(())
}
