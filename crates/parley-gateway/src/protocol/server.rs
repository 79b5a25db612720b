//! Server-to-client events

use parley_core::{Chat, ChatId, Message, UserId};
use serde::{Deserialize, Serialize};

/// Events the server pushes to connected clients
///
/// Envelope shape mirrors [`ClientEvent`](super::ClientEvent):
/// `{"event": "<name>", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// A new message for one of the chats this user belongs to
    ReceiveMessage { message: Message },

    /// Another member's typing state changed
    UserTyping {
        chat_id: ChatId,
        user_id: UserId,
        is_typing: bool,
    },

    /// This user was added to a chat
    NewChatAdded { chat: Chat },

    /// A chat's membership changed; refresh the member list
    ChatUpdated { chat: Chat },

    /// Online-contacts snapshot, sent once after identify
    OnlineUsers(Vec<UserId>),

    /// A contact came online
    UserOnline { user_id: UserId },

    /// A contact went offline
    UserOffline { user_id: UserId },

    /// Diagnostic echo
    Debug { message: String },

    /// A client action failed; the connection itself stays usable
    Error { message: String },
}

impl ServerEvent {
    /// Create a diagnostic event
    pub fn debug(message: impl Into<String>) -> Self {
        Self::Debug {
            message: message.into(),
        }
    }

    /// Create an action-failure event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Get the wire name of this event (for logs)
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveMessage { .. } => "receiveMessage",
            Self::UserTyping { .. } => "userTyping",
            Self::NewChatAdded { .. } => "newChatAdded",
            Self::ChatUpdated { .. } => "chatUpdated",
            Self::OnlineUsers(_) => "onlineUsers",
            Self::UserOnline { .. } => "userOnline",
            Self::UserOffline { .. } => "userOffline",
            Self::Debug { .. } => "debug",
            Self::Error { .. } => "error",
        }
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON text frame
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
