//! Channel resolution and ID handling

use grammers_client::types::peer::Peer;
use grammers_client::Client;

use crate::config::ChannelRef;
use crate::error::{Error, Result};

/// Title reported for channels that cannot be resolved
pub const INACCESSIBLE_TITLE: &str = "_inaccessible: private or banned";

/// Marked channel IDs are `-100` followed by the bare ID
const CHANNEL_MARK: i64 = -1_000_000_000_000;

/// Convert a marked bot-API style ID (`-100...`) to the bare channel ID.
/// Bare positive IDs pass through unchanged.
pub fn normalize_channel_id(id: i64) -> i64 {
    if id < CHANNEL_MARK {
        -(id - CHANNEL_MARK)
    } else if id < 0 {
        -id
    } else {
        id
    }
}

/// Resolve a ChannelRef to an actual Peer
pub async fn resolve_channel(client: &Client, target: &ChannelRef) -> Result<Peer> {
    match target {
        ChannelRef::Id(target_id) => {
            // Resolving by bare ID requires the channel to be in the
            // user's dialogs
            let mut dialogs = client.iter_dialogs();

            while let Some(dialog) = dialogs
                .next()
                .await
                .map_err(|e| Error::TelegramError(e.to_string()))?
            {
                match &dialog.peer {
                    Peer::Channel(channel) => {
                        // Compare using raw ID from the underlying TL type
                        if channel.raw.id == *target_id {
                            return Ok(Peer::Channel(channel.clone()));
                        }
                    }
                    Peer::Group(group) => {
                        // Megagroups carry a channel ID too
                        if let grammers_tl_types::enums::Chat::Channel(c) = &group.raw {
                            if c.id == *target_id {
                                return Ok(Peer::Group(group.clone()));
                            }
                        }
                    }
                    Peer::User(_) => {}
                }
            }

            Err(Error::ChannelNotFound(format!(
                "Channel {} not found in dialogs",
                target_id
            )))
        }
        ChannelRef::Username(username) => client
            .resolve_username(username)
            .await
            .map_err(|e| Error::TelegramError(e.to_string()))?
            .ok_or_else(|| Error::ChannelNotFound(format!("Username @{} not found", username))),
    }
}

/// Bare numeric ID of a resolved peer; used as the log file name
pub fn peer_channel_id(peer: &Peer) -> i64 {
    match peer {
        Peer::User(user) => user.raw.id(),
        Peer::Group(group) => match &group.raw {
            grammers_tl_types::enums::Chat::Empty(c) => c.id,
            grammers_tl_types::enums::Chat::Chat(c) => c.id,
            grammers_tl_types::enums::Chat::Forbidden(c) => c.id,
            grammers_tl_types::enums::Chat::Channel(c) => c.id,
            grammers_tl_types::enums::Chat::ChannelForbidden(c) => c.id,
        },
        Peer::Channel(channel) => channel.raw.id,
    }
}

/// Get the display name for a peer
pub fn peer_title(peer: &Peer) -> String {
    peer.name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
