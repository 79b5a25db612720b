//! Chat entity - represents a conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChatId, UserId};

/// Kind of conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// Two participants, no name
    Private,
    /// Any number of participants, named
    Group,
}

/// Chat entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub kind: ChatKind,
    /// Display name; `None` for private chats
    pub name: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Create a new private chat
    pub fn new_private(id: ChatId, created_by: UserId) -> Self {
        Self {
            id,
            kind: ChatKind::Private,
            name: None,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Create a new group chat
    pub fn new_group(id: ChatId, name: String, created_by: UserId) -> Self {
        Self {
            id,
            kind: ChatKind::Group,
            name: Some(name),
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Check if this is a group conversation
    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ChatKind::Group)
    }
}
