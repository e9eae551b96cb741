//! Channel inspection command.

use tracing::warn;

use crate::channel::{peer_channel_id, peer_title, resolve_channel, INACCESSIBLE_TITLE};
use crate::config::{ChannelRef, Config};
use crate::error::Result;
use crate::session::{get_client, SessionLock};

/// What we could find out about a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Bare positive channel ID, when the channel could be reached
    pub channel_id: Option<i64>,
    pub title: String,
}

impl ChannelInfo {
    pub fn is_accessible(&self) -> bool {
        self.channel_id.is_some()
    }
}

/// Look a channel up and report its ID and title. A channel that cannot
/// be reached gets a placeholder title instead of an error.
pub async fn run(target: &ChannelRef) -> Result<ChannelInfo> {
    let config = Config::new();

    // Acquire session lock
    let _lock = SessionLock::acquire()?;

    // Connect to Telegram
    let client = get_client(&config).await?;

    match resolve_channel(&client, target).await {
        Ok(peer) => Ok(ChannelInfo {
            channel_id: Some(peer_channel_id(&peer)),
            title: peer_title(&peer),
        }),
        Err(err) => {
            warn!("Could not connect to {}: {}", target, err);
            Ok(ChannelInfo {
                channel_id: None,
                title: INACCESSIBLE_TITLE.to_string(),
            })
        }
    }
}
