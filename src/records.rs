//! Message records as stored in channel logs
//!
//! The JSON shape keeps the Telethon field names and `"_"` class tags so
//! logs produced by the old Python tooling and by this crate can be
//! aggregated interchangeably.

use chrono::{DateTime, Utc};
use grammers_client::types::Message;
use grammers_tl_types as tl;
use serde::{Deserialize, Serialize};

/// Peer reference with the wire-style class tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_")]
pub enum PeerRef {
    PeerUser { user_id: i64 },
    PeerChat { chat_id: i64 },
    PeerChannel { channel_id: i64 },
}

impl PeerRef {
    pub fn from_tl(peer: &tl::enums::Peer) -> Self {
        match peer {
            tl::enums::Peer::User(p) => PeerRef::PeerUser { user_id: p.user_id },
            tl::enums::Peer::Chat(p) => PeerRef::PeerChat { chat_id: p.chat_id },
            tl::enums::Peer::Channel(p) => PeerRef::PeerChannel {
                channel_id: p.channel_id,
            },
        }
    }

    /// Channel ID if this peer is a channel
    pub fn channel_id(&self) -> Option<i64> {
        match self {
            PeerRef::PeerChannel { channel_id } => Some(*channel_id),
            _ => None,
        }
    }
}

/// Forward header of a forwarded message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardHeader {
    /// When the original message was posted
    pub date: DateTime<Utc>,
    /// Where the message was forwarded from; a channel here makes the
    /// message count as a channel forward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_id: Option<PeerRef>,
    /// Sender name for forwards from hidden accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    /// Message ID in the source channel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_author: Option<String>,
}

impl ForwardHeader {
    pub fn from_tl(header: &tl::enums::MessageFwdHeader) -> Self {
        let tl::enums::MessageFwdHeader::Header(h) = header;
        ForwardHeader {
            date: DateTime::from_timestamp(i64::from(h.date), 0).unwrap_or_default(),
            from_id: h.from_id.as_ref().map(PeerRef::from_tl),
            from_name: h.from_name.clone(),
            channel_post: h.channel_post,
            post_author: h.post_author.clone(),
        }
    }
}

/// One message of a channel history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message ID within the channel
    pub id: i32,
    /// When the message was sent
    pub date: DateTime<Utc>,
    /// Text content (empty for service and media-only messages)
    #[serde(default)]
    pub message: String,
    /// Whether the message was sent by the logged-in account
    #[serde(default)]
    pub out: bool,
    /// Message author (channel posts usually have none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_id: Option<PeerRef>,
    /// Chat the message belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_id: Option<PeerRef>,
    /// Forward header when the message is a forward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fwd_from: Option<ForwardHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_msg_id: Option<i32>,
    /// View count for channel posts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<i32>,
    /// How often the message itself was forwarded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwards: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_author: Option<String>,
    /// Whether the message carries media
    #[serde(default)]
    pub has_media: bool,
}

impl MessageRecord {
    /// Build a record from a fetched message. Service messages come out
    /// as bare id/date entries without a forward header.
    pub fn from_message(msg: &Message) -> Self {
        let mut record = MessageRecord {
            id: msg.id(),
            date: msg.date(),
            message: msg.text().to_string(),
            out: msg.outgoing(),
            from_id: None,
            peer_id: None,
            fwd_from: None,
            reply_to_msg_id: msg.reply_to_message_id(),
            views: None,
            forwards: None,
            post_author: None,
            has_media: msg.media().is_some(),
        };

        match &msg.raw {
            tl::enums::Message::Message(m) => {
                record.from_id = m.from_id.as_ref().map(PeerRef::from_tl);
                record.peer_id = Some(PeerRef::from_tl(&m.peer_id));
                record.fwd_from = m.fwd_from.as_ref().map(ForwardHeader::from_tl);
                record.views = m.views;
                record.forwards = m.forwards;
                record.post_author = m.post_author.clone();
            }
            tl::enums::Message::Service(m) => {
                record.from_id = m.from_id.as_ref().map(PeerRef::from_tl);
                record.peer_id = Some(PeerRef::from_tl(&m.peer_id));
            }
            _ => {}
        }

        record
    }

    /// Source channel ID when the message is a forward from a channel
    pub fn forward_source(&self) -> Option<i64> {
        self.fwd_from.as_ref()?.from_id.as_ref()?.channel_id()
    }
}
