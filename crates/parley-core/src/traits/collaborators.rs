//! Collaborator traits - interfaces to the subsystems this repository
//! treats as external
//!
//! Credential issuance, relational persistence, and image storage live
//! behind these ports. The realtime layer defines what it needs; an
//! infrastructure crate (or the in-memory test double) provides it.

use async_trait::async_trait;

use crate::entities::{Chat, Message, User};
use crate::error::DomainError;
use crate::ids::{ChatId, UserId};

/// Result type for collaborator operations
pub type StoreResult<T> = Result<T, DomainError>;

/// User directory: lookup of user accounts by id
///
/// Used to authenticate a connection's claimed identity before `identify`
/// binds it.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by ID; `Ok(None)` if the id is unknown
    async fn lookup_user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
}

/// Chat/message store: the authoritative record of conversations,
/// memberships, and messages
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Find a chat by ID; `Ok(None)` if the id is unknown
    async fn get_chat(&self, chat_id: ChatId) -> StoreResult<Option<Chat>>;

    /// List the chats a user currently belongs to
    ///
    /// The session reconciler treats the returned set as authoritative, so
    /// implementations must answer from current state, never a cache.
    async fn list_chats_for_user(&self, user_id: UserId) -> StoreResult<Vec<ChatId>>;

    /// List the current members of a chat
    async fn list_members(&self, chat_id: ChatId) -> StoreResult<Vec<UserId>>;

    /// Append a message to a chat and return the persisted record
    async fn append_message(
        &self,
        chat_id: ChatId,
        sender_id: UserId,
        content: &str,
    ) -> StoreResult<Message>;

    /// Add a member to a chat
    async fn add_member(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()>;

    /// Remove a member from a chat
    async fn remove_member(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()>;
}
