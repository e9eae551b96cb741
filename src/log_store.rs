//! Channel log files
//!
//! Each logged channel becomes one `<bare_id>.json` file under the logs
//! directory, holding the channel history as a flat JSON array of
//! message records.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::records::MessageRecord;

/// Log file path for a channel
pub fn log_path(logs_dir: &Path, channel_id: i64) -> PathBuf {
    logs_dir.join(format!("{}.json", channel_id))
}

/// Skip heuristic: an existing log above the size floor counts as a
/// complete download
pub fn has_usable_log(path: &Path, min_bytes: u64) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > min_bytes)
        .unwrap_or(false)
}

/// Channel IDs recovered from `<id>.json` file names in the logs directory
pub fn logged_channel_ids(logs_dir: &Path) -> Vec<i64> {
    let mut ids: Vec<i64> = WalkDir::new(logs_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
        .filter_map(|entry| {
            entry
                .path()
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<i64>().ok())
        })
        .collect();
    ids.sort_unstable();
    ids
}

/// Streaming writer for one channel log
///
/// Layout is `[\n`, records joined by `,\n`, then `\n]`. The writer
/// tracks whether a separator is due instead of trimming trailing bytes,
/// so a channel with no messages still produces a valid empty array.
pub struct ChannelLogWriter {
    writer: BufWriter<File>,
    records_written: usize,
}

impl ChannelLogWriter {
    /// Create the logs directory if needed and start a fresh log
    pub fn create(logs_dir: &Path, channel_id: i64) -> Result<Self> {
        fs::create_dir_all(logs_dir)?;
        let file = File::create(log_path(logs_dir, channel_id))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(b"[\n")?;

        Ok(Self {
            writer,
            records_written: 0,
        })
    }

    /// Append one record to the array
    pub fn write_record(&mut self, record: &MessageRecord) -> Result<()> {
        if self.records_written > 0 {
            self.writer.write_all(b",\n")?;
        }
        serde_json::to_writer(&mut self.writer, record)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Close the array and flush, returning the record count
    pub fn finish(mut self) -> Result<usize> {
        if self.records_written > 0 {
            self.writer.write_all(b"\n]")?;
        } else {
            self.writer.write_all(b"]")?;
        }
        self.writer.flush()?;
        Ok(self.records_written)
    }
}

/// Read a channel log back into records
pub fn read_log(path: &Path) -> Result<Vec<MessageRecord>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
