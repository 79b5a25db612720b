//! Message entity - represents a persisted chat message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChatId, MessageId, UserId};

/// Maximum message content length accepted for persistence
pub const MAX_CONTENT_LEN: usize = 4000;

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message
    pub fn new(id: MessageId, chat_id: ChatId, sender_id: UserId, content: String) -> Self {
        Self {
            id,
            chat_id,
            sender_id,
            content,
            created_at: Utc::now(),
        }
    }

    /// Check if message content is empty after trimming
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Get a truncated preview of the message (for logs and notifications)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }
}
