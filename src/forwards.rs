//! Forward source extraction and frequency counting
//!
//! A "forward source" is the channel a forwarded post originally came
//! from. Extraction projects a channel log down to
//! `fwd_from.from_id.channel_id` and ignores everything else, so it
//! also reads logs with fields this crate never writes.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Minimal view of a logged message: only the forward origin matters
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LoggedForward {
    fwd_from: Option<ForwardOrigin>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ForwardOrigin {
    from_id: Option<TaggedPeer>,
}

/// Peer keyed by its `"_"` class tag; everything that is not a channel
/// collapses into `Other`
#[derive(Debug, Deserialize)]
#[serde(tag = "_")]
enum TaggedPeer {
    PeerChannel { channel_id: i64 },
    #[serde(other)]
    Other,
}

/// Extract forward source channel IDs from the raw bytes of a log file
pub fn forward_sources_from_slice(data: &[u8]) -> Result<Vec<i64>> {
    let messages: Vec<LoggedForward> = serde_json::from_slice(data)?;

    Ok(messages
        .iter()
        .filter_map(|message| match message.fwd_from.as_ref()?.from_id.as_ref()? {
            TaggedPeer::PeerChannel { channel_id } => Some(*channel_id),
            TaggedPeer::Other => None,
        })
        .collect())
}

/// Extract forward sources from a channel log file
pub fn forward_sources_from_file(path: &Path) -> Result<Vec<i64>> {
    let data = fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => Error::LogNotFound(path.display().to_string()),
        _ => Error::IoError(err),
    })?;

    forward_sources_from_slice(&data)
}

/// Frequency counter over forward source channel IDs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceCounter {
    counts: HashMap<i64, u64>,
}

impl SourceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of a source channel
    pub fn add(&mut self, channel_id: i64) {
        *self.counts.entry(channel_id).or_insert(0) += 1;
    }

    pub fn extend<I: IntoIterator<Item = i64>>(&mut self, ids: I) {
        for id in ids {
            self.add(id);
        }
    }

    pub fn merge(&mut self, other: SourceCounter) {
        for (id, count) in other.counts {
            *self.counts.entry(id).or_insert(0) += count;
        }
    }

    /// Number of distinct source channels
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, channel_id: i64) -> u64 {
        self.counts.get(&channel_id).copied().unwrap_or(0)
    }

    /// Total occurrences across all sources
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Sources ordered most frequent first; equal counts order by
    /// ascending channel ID so reports are stable between runs
    pub fn most_common(&self) -> Vec<(i64, u64)> {
        let mut entries: Vec<(i64, u64)> = self.counts.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }
}

/// Render the report: one `channel_id: count` line per source
pub fn render_report(counter: &SourceCounter) -> String {
    let mut out = String::new();
    for (channel_id, count) in counter.most_common() {
        let _ = writeln!(out, "{}: {}", channel_id, count);
    }
    out
}

/// Render the report as CSV with a header row
pub fn render_report_csv(counter: &SourceCounter) -> String {
    let mut csv = String::from("channel_id,count\n");
    for (channel_id, count) in counter.most_common() {
        let _ = writeln!(csv, "{},{}", channel_id, count);
    }
    csv
}

/// Write the `channel_id: count` report to a file
pub fn write_report(path: &Path, counter: &SourceCounter) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, render_report(counter))?;
    Ok(())
}
