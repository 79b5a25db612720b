//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::ids::{ChatId, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // Not found
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Chat not found: {0}")]
    ChatNotFound(ChatId),

    #[error("User {user_id} is not a member of chat {chat_id}")]
    NotAMember { chat_id: ChatId, user_id: UserId },

    // Validation
    #[error("Message content is empty")]
    EmptyContent,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // Conflict
    #[error("User {user_id} is already a member of chat {chat_id}")]
    AlreadyMember { chat_id: ChatId, user_id: UserId },

    // Infrastructure (wrapped)
    /// The persistence collaborator could not be reached; always recoverable
    /// by retrying, never a reason to tear down a connection.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DomainError {
    /// Check if this is a "not found" error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::ChatNotFound(_) | Self::NotAMember { .. }
        )
    }

    /// Check if this is a validation error
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyContent | Self::ContentTooLong { .. })
    }

    /// Check if the operation can be retried later
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
