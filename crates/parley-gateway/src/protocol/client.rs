//! Client-to-server events

use parley_core::{ChatId, UserId};
use serde::{Deserialize, Serialize};

/// Events a client may send over its connection
///
/// Envelope shape: `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Bind this connection to a user identity (exactly once per connection)
    Identify { user_id: UserId },

    /// Defensive explicit resubscribe to a chat's events; membership is
    /// confirmed against the authoritative store before taking effect
    JoinRoom { chat_id: ChatId },

    /// Drop the routing subscription for a chat
    LeaveRoom { chat_id: ChatId },

    /// Typing signal; `user_id` must match the connection identity
    Typing {
        chat_id: ChatId,
        user_id: UserId,
        is_typing: bool,
    },

    /// Direct send path: persists the message, then fans it out. The
    /// canonical path is the REST API, which performs the same sequence.
    SendMessage {
        chat_id: ChatId,
        sender_id: UserId,
        content: String,
    },
}

impl ClientEvent {
    /// Get the wire name of this event (for logs)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identify { .. } => "identify",
            Self::JoinRoom { .. } => "joinRoom",
            Self::LeaveRoom { .. } => "leaveRoom",
            Self::Typing { .. } => "typing",
            Self::SendMessage { .. } => "sendMessage",
        }
    }

    /// Deserialize from a JSON text frame
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
