//! Realtime events - events fanned out to live connections
//!
//! These are produced by the message-send path, the group-management path,
//! the typing handler, and the presence tracker, and consumed by the event
//! router. They are an in-process currency, not a wire format; the gateway
//! protocol layer decides how each one appears to clients.

use crate::entities::{Chat, Message};
use crate::ids::{ChatId, UserId};

/// Direction of a membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    Added,
    Removed,
}

/// All events the router can fan out
#[derive(Debug, Clone)]
pub enum RealtimeEvent {
    /// A message was persisted and must reach every member device,
    /// the sender's other connections included.
    MessageCreated { chat_id: ChatId, message: Message },

    /// A user started or stopped typing in a chat. Never echoed back to the
    /// typing user. A `true` with no follow-up expires into a synthesized
    /// `false` after the inactivity window.
    TypingChanged {
        chat_id: ChatId,
        user_id: UserId,
        is_typing: bool,
    },

    /// A user was added to or removed from a chat. Carries the full chat so
    /// a newly added member can render the conversation without a refetch.
    MembershipChanged {
        chat: Chat,
        user_id: UserId,
        action: MembershipAction,
    },

    /// A user crossed the online/offline boundary. Fanned out to contacts
    /// (users sharing at least one chat), never globally.
    PresenceChanged { user_id: UserId, online: bool },
}

impl RealtimeEvent {
    /// Get the event type name (for logs)
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageCreated { .. } => "message_created",
            Self::TypingChanged { .. } => "typing_changed",
            Self::MembershipChanged { .. } => "membership_changed",
            Self::PresenceChanged { .. } => "presence_changed",
        }
    }

    /// The chat this event is scoped to, if any
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Self::MessageCreated { chat_id, .. } | Self::TypingChanged { chat_id, .. } => {
                Some(*chat_id)
            }
            Self::MembershipChanged { chat, .. } => Some(chat.id),
            Self::PresenceChanged { .. } => None,
        }
    }
}
