//! Handler error types

use crate::registry::RegistryError;
use parley_core::{ChatId, DomainError};
use thiserror::Error;

/// Handler error type
///
/// Every variant is recoverable at the connection level: the client gets an
/// `error` event for the failed action and the connection stays usable.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The action requires an identified connection
    #[error("Not identified")]
    NotIdentified,

    /// The claimed identity could not be authenticated
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Payload identity does not match the connection's bound identity
    #[error("Identity mismatch")]
    IdentityMismatch,

    /// The user is not a member of the referenced chat
    #[error("Not a member of chat {0}")]
    NotAMember(ChatId),

    /// Registry error (unknown connection, duplicate identify)
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Domain error (from the collaborator stores)
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl HandlerError {
    /// The message put on the wire in the `error` event
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(e) if e.is_retryable() => {
                "Service temporarily unavailable, please retry".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether the failure is transient (store outage) rather than a bad
    /// request
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_retryable())
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
