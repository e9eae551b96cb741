//! Forward source aggregation command.
//!
//! Builds the frequency report of where forwarded posts in the tracked
//! channels originally came from. Existing log files are preferred;
//! channels without a log are scraped live unless offline mode is on.

use std::fs;
use std::path::PathBuf;

use grammers_client::types::peer::Peer;
use grammers_client::Client;
use tracing::{info, warn};

use crate::channel::{peer_channel_id, resolve_channel};
use crate::config::{ChannelRef, Config};
use crate::error::{Error, Result};
use crate::forwards::{
    forward_sources_from_file, render_report_csv, write_report, SourceCounter,
};
use crate::log_store::{log_path, logged_channel_ids};
use crate::metrics;
use crate::records::MessageRecord;
use crate::session::{get_client, SessionLock};

/// Options for an aggregation run.
#[derive(Debug, Default, Clone)]
pub struct SourcesOptions {
    /// Never connect to Telegram; channels without a log are skipped
    pub offline: bool,
    /// Aggregate every log in the logs directory instead of the
    /// configured channel list
    pub from_logs: bool,
    /// Report destination; defaults to the configured report file
    pub output: Option<PathBuf>,
    /// Also write the report as CSV to this path
    pub csv: Option<PathBuf>,
    /// Message cap per live-scraped channel
    pub limit: Option<usize>,
}

/// Outcome of an aggregation run.
#[derive(Debug)]
pub struct SourcesReport {
    pub counter: SourceCounter,
    /// Channels examined
    pub channels: usize,
    /// Channels read from existing log files
    pub from_files: usize,
    /// Channels scraped live
    pub scraped: usize,
    /// Channels skipped (no log and unreachable or offline)
    pub skipped: usize,
    pub report_path: PathBuf,
}

/// Aggregate forward sources and write the report file.
pub async fn run(options: SourcesOptions) -> Result<SourcesReport> {
    let config = Config::new();

    let targets: Vec<ChannelRef> = if options.from_logs {
        logged_channel_ids(&config.logs_dir)
            .into_iter()
            .map(ChannelRef::Id)
            .collect()
    } else {
        config.channels.clone()
    };
    if targets.is_empty() {
        return Err(Error::InvalidArgument(
            "no channels to aggregate; configure some or use --from-logs".to_string(),
        ));
    }

    info!("Checking {} channels...", targets.len());

    let mut report = SourcesReport {
        counter: SourceCounter::new(),
        channels: targets.len(),
        from_files: 0,
        scraped: 0,
        skipped: 0,
        report_path: options
            .output
            .clone()
            .unwrap_or_else(|| config.report_file.clone()),
    };

    // First pass: everything that already has a log file on disk
    let mut misses: Vec<ChannelRef> = Vec::new();
    for target in targets {
        match &target {
            ChannelRef::Id(id) => {
                let path = log_path(&config.logs_dir, *id);
                if path.is_file() {
                    info!("Using existing log file {}", path.display());
                    report.counter.extend(forward_sources_from_file(&path)?);
                    report.from_files += 1;
                } else {
                    misses.push(target);
                }
            }
            // Usernames need resolution before a log file can be looked up
            ChannelRef::Username(_) => misses.push(target),
        }
    }

    // Second pass: channels without a log
    if options.offline {
        for target in &misses {
            match target {
                ChannelRef::Id(id) => warn!(
                    "Log {} not found, skipping (generally due to a channel being removed by Telegram)",
                    log_path(&config.logs_dir, *id).display()
                ),
                ChannelRef::Username(_) => {
                    warn!("No log file for {}, skipping in offline mode", target)
                }
            }
            report.skipped += 1;
        }
    } else if !misses.is_empty() {
        // Acquire session lock
        let _lock = SessionLock::acquire()?;

        // Connect to Telegram
        let client = get_client(&config).await?;

        let total = misses.len();
        for (index, target) in misses.iter().enumerate() {
            info!("{} remaining", total - index);
            scrape_target(&client, &config, target, &options, &mut report).await?;
        }
    }

    write_report(&report.report_path, &report.counter)?;
    info!(
        "Report written to {} ({} sources)",
        report.report_path.display(),
        report.counter.len()
    );

    if let Some(csv_path) = &options.csv {
        fs::write(csv_path, render_report_csv(&report.counter))?;
        info!("CSV written to {}", csv_path.display());
    }

    Ok(report)
}

/// Aggregate one channel that had no log file under its configured ID.
/// Resolution failures are skips, not errors.
async fn scrape_target(
    client: &Client,
    config: &Config,
    target: &ChannelRef,
    options: &SourcesOptions,
    report: &mut SourcesReport,
) -> Result<()> {
    let peer = match resolve_channel(client, target).await {
        Ok(peer) => peer,
        Err(err) => {
            warn!(
                "Could not connect to {}: {}. Returning no sources for it.",
                target, err
            );
            report.skipped += 1;
            return Ok(());
        }
    };

    // A resolved username may turn out to have a log under its bare ID
    let channel_id = peer_channel_id(&peer);
    let path = log_path(&config.logs_dir, channel_id);
    if path.is_file() {
        info!("Using existing log file {}", path.display());
        report.counter.extend(forward_sources_from_file(&path)?);
        report.from_files += 1;
        return Ok(());
    }

    info!("Scraping channel {} live...", channel_id);
    report
        .counter
        .extend(live_forward_sources(client, &peer, channel_id, options.limit).await?);
    report.scraped += 1;
    Ok(())
}

/// Collect forward sources straight from a channel's history.
async fn live_forward_sources(
    client: &Client,
    peer: &Peer,
    channel_id: i64,
    limit: Option<usize>,
) -> Result<Vec<i64>> {
    let mut sources = Vec::new();
    let mut scanned = 0usize;
    let mut iter = client.iter_messages(peer);

    while let Some(msg) = iter.next().await? {
        if let Some(source) = MessageRecord::from_message(&msg).forward_source() {
            sources.push(source);
        }
        scanned += 1;
        if limit.is_some_and(|cap| scanned >= cap) {
            break;
        }
    }

    metrics::record_channel_scan(channel_id, scanned, sources.len());
    Ok(sources)
}

/// Print the top sources as a small table.
pub fn print_top(report: &SourcesReport, top: usize) {
    let entries = report.counter.most_common();

    println!("\n=== Forward Sources ===\n");
    println!(
        "Channels examined: {} ({} from files, {} scraped, {} skipped)",
        report.channels, report.from_files, report.scraped, report.skipped
    );
    println!(
        "Distinct sources: {} across {} forwards",
        report.counter.len(),
        report.counter.total()
    );

    println!("\n{:<4} {:<16} {:>8}", "#", "Channel ID", "Count");
    println!("{}", "-".repeat(30));

    for (i, (channel_id, count)) in entries.iter().take(top).enumerate() {
        println!("{:<4} {:<16} {:>8}", i + 1, channel_id, count);
    }

    if entries.len() > top {
        println!(
            "... and {} more in {}",
            entries.len() - top,
            report.report_path.display()
        );
    }
}
