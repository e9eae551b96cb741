//! Telegram Forward Source Tracker Library
//!
//! This library provides tools to:
//! - Log full channel histories to flat JSON files, one per channel
//! - Extract the origin channel of every forwarded post from those logs
//! - Aggregate origins into a frequency report sorted by count
//! - Scrape channels live when no log file exists yet
//! - Manage the Telegram session and its single-process lock

pub mod channel;
pub mod config;
pub mod error;
pub mod forwards;
pub mod log_store;
pub mod metrics;
pub mod records;
pub mod session;

// Re-export common types
pub use channel::normalize_channel_id;
pub use config::{ChannelRef, Config};
pub use error::{Error, Result};
pub use forwards::SourceCounter;
pub use records::MessageRecord;
pub use session::{check_session_exists, get_client, SessionLock};

// Commands sit on top of everything re-exported above
pub mod commands;
