//! Standalone channel logger - writes logs/{channel_id}.json files.

use clap::Parser;
use forward_tracker::commands::log_channel;
use forward_tracker::ChannelRef;

#[derive(Parser)]
#[command(name = "log_channel")]
#[command(about = "Log Telegram channel history to JSON files")]
struct Cli {
    /// Channel ID or @username; all configured channels when omitted
    channel: Option<String>,

    /// Rewrite logs that already exist
    #[arg(short, long)]
    overwrite: bool,

    /// Maximum number of messages to fetch per channel
    #[arg(short, long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let target = cli.channel.as_deref().map(ChannelRef::parse);
    let summary = log_channel::run(target, Some(cli.overwrite), cli.limit).await?;

    println!(
        "Done: {} written, {} kept existing, {} unreachable",
        summary.written, summary.kept, summary.unreachable
    );
    Ok(())
}
