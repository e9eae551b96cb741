//! Channel logging command.
//!
//! Fetches a channel's history and writes it to `logs/<id>.json`. With
//! no explicit target every configured channel is logged in turn.

use grammers_client::Client;
use tracing::{info, warn};

use crate::channel::{peer_channel_id, peer_title, resolve_channel};
use crate::config::{ChannelRef, Config};
use crate::error::{Error, Result};
use crate::log_store::{has_usable_log, log_path, ChannelLogWriter};
use crate::metrics;
use crate::records::MessageRecord;
use crate::session::{get_client, SessionLock};

/// What happened to a single channel during a logging pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    /// Fresh log written with this many records
    Written { channel_id: i64, records: usize },
    /// Existing log kept untouched
    KeptExisting { channel_id: i64 },
    /// Channel could not be resolved; most likely private or banned
    Unreachable,
}

impl LogOutcome {
    /// Stable label for metrics and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            LogOutcome::Written { .. } => "written",
            LogOutcome::KeptExisting { .. } => "kept",
            LogOutcome::Unreachable => "unreachable",
        }
    }
}

/// Tally over a whole logging pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogSummary {
    pub written: usize,
    pub kept: usize,
    pub unreachable: usize,
}

impl LogSummary {
    pub fn record(&mut self, outcome: &LogOutcome) {
        match outcome {
            LogOutcome::Written { .. } => self.written += 1,
            LogOutcome::KeptExisting { .. } => self.kept += 1,
            LogOutcome::Unreachable => self.unreachable += 1,
        }
    }

    pub fn channels(&self) -> usize {
        self.written + self.kept + self.unreachable
    }
}

/// Log one channel, or every configured channel when `target` is None.
pub async fn run(
    target: Option<ChannelRef>,
    overwrite: Option<bool>,
    limit: Option<usize>,
) -> Result<LogSummary> {
    let config = Config::new();
    let overwrite = overwrite.unwrap_or(config.overwrite);
    let limit = limit.or_else(|| config.message_limit());

    let targets: Vec<ChannelRef> = match target {
        Some(t) => vec![t],
        None => config.channels.clone(),
    };
    if targets.is_empty() {
        return Err(Error::InvalidArgument(
            "no channel given and none configured".to_string(),
        ));
    }

    // Acquire session lock
    let _lock = SessionLock::acquire()?;

    // Connect to Telegram
    let client = get_client(&config).await?;

    info!("Logging {} channels...", targets.len());

    let mut summary = LogSummary::default();
    for (index, target) in targets.iter().enumerate() {
        info!("{} channels remaining", targets.len() - index);
        let outcome = log_one(&client, &config, target, overwrite, limit).await?;
        metrics::record_log_outcome(outcome.label());
        summary.record(&outcome);
    }

    info!(
        "Logging pass finished: {} written, {} kept, {} unreachable",
        summary.written, summary.kept, summary.unreachable
    );

    Ok(summary)
}

/// Log a single channel. Resolution failures are reported as
/// `Unreachable` rather than errors so a pass over many channels keeps
/// going.
async fn log_one(
    client: &Client,
    config: &Config,
    target: &ChannelRef,
    overwrite: bool,
    limit: Option<usize>,
) -> Result<LogOutcome> {
    let peer = match resolve_channel(client, target).await {
        Ok(peer) => peer,
        Err(err) => {
            warn!(
                "Could not connect to {}: {}. Likely a private or banned channel.",
                target, err
            );
            return Ok(LogOutcome::Unreachable);
        }
    };

    let channel_id = peer_channel_id(&peer);
    let path = log_path(&config.logs_dir, channel_id);

    if !overwrite && has_usable_log(&path, config.min_log_bytes) {
        info!("Log {} already exists, keeping it.", path.display());
        return Ok(LogOutcome::KeptExisting { channel_id });
    }

    info!("Logging '{}' to {}...", peer_title(&peer), path.display());

    let mut writer = ChannelLogWriter::create(&config.logs_dir, channel_id)?;
    let mut iter = client.iter_messages(&peer);
    let mut forwards = 0usize;

    while let Some(msg) = iter.next().await? {
        let record = MessageRecord::from_message(&msg);
        if record.forward_source().is_some() {
            forwards += 1;
        }
        writer.write_record(&record)?;
        if limit.is_some_and(|cap| writer.records_written() >= cap) {
            break;
        }
    }

    let records = writer.finish()?;
    metrics::record_channel_scan(channel_id, records, forwards);
    info!("Logged {} messages from channel {}", records, channel_id);

    Ok(LogOutcome::Written {
        channel_id,
        records,
    })
}
