//! In-memory chat/message store

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use parley_core::entities::MAX_CONTENT_LEN;
use parley_core::{
    Chat, ChatId, ChatStore, DomainError, Message, MessageId, StoreResult, UserId,
};

/// In-memory `ChatStore` implementation
///
/// Membership is the authoritative record the session reconciler diffs
/// against, so mutations through `add_member`/`remove_member` are visible to
/// `list_chats_for_user` immediately.
#[derive(Debug, Default)]
pub struct MemoryChatStore {
    chats: DashMap<ChatId, Chat>,
    members: DashMap<ChatId, HashSet<UserId>>,
    messages: DashMap<ChatId, Vec<Message>>,
    next_chat_id: AtomicI64,
    next_message_id: AtomicI64,
    unavailable: AtomicBool,
}

impl MemoryChatStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_chat_id: AtomicI64::new(1),
            next_message_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Create a private chat between two users
    pub fn create_private_chat(&self, user1: UserId, user2: UserId) -> Chat {
        let id = ChatId::new(self.next_chat_id.fetch_add(1, Ordering::SeqCst));
        let chat = Chat::new_private(id, user1);
        self.chats.insert(id, chat.clone());
        self.members.insert(id, [user1, user2].into_iter().collect());
        chat
    }

    /// Create a group chat with an initial member set
    pub fn create_group_chat(
        &self,
        name: impl Into<String>,
        created_by: UserId,
        members: impl IntoIterator<Item = UserId>,
    ) -> Chat {
        let id = ChatId::new(self.next_chat_id.fetch_add(1, Ordering::SeqCst));
        let chat = Chat::new_group(id, name.into(), created_by);
        self.chats.insert(id, chat.clone());
        let mut set: HashSet<UserId> = members.into_iter().collect();
        set.insert(created_by);
        self.members.insert(id, set);
        chat
    }

    /// Toggle failure injection
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Messages persisted for a chat (test observation)
    pub fn message_count(&self, chat_id: ChatId) -> usize {
        self.messages.get(&chat_id).map_or(0, |m| m.len())
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DomainError::StoreUnavailable(
                "chat store unreachable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn get_chat(&self, chat_id: ChatId) -> StoreResult<Option<Chat>> {
        self.check_available()?;
        Ok(self.chats.get(&chat_id).map(|c| c.clone()))
    }

    async fn list_chats_for_user(&self, user_id: UserId) -> StoreResult<Vec<ChatId>> {
        self.check_available()?;
        Ok(self
            .members
            .iter()
            .filter(|entry| entry.value().contains(&user_id))
            .map(|entry| *entry.key())
            .collect())
    }

    async fn list_members(&self, chat_id: ChatId) -> StoreResult<Vec<UserId>> {
        self.check_available()?;
        if !self.chats.contains_key(&chat_id) {
            return Err(DomainError::ChatNotFound(chat_id));
        }
        Ok(self
            .members
            .get(&chat_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn append_message(
        &self,
        chat_id: ChatId,
        sender_id: UserId,
        content: &str,
    ) -> StoreResult<Message> {
        self.check_available()?;
        if !self.chats.contains_key(&chat_id) {
            return Err(DomainError::ChatNotFound(chat_id));
        }
        let is_member = self
            .members
            .get(&chat_id)
            .is_some_and(|set| set.contains(&sender_id));
        if !is_member {
            return Err(DomainError::NotAMember {
                chat_id,
                user_id: sender_id,
            });
        }
        if content.trim().is_empty() {
            return Err(DomainError::EmptyContent);
        }
        if content.len() > MAX_CONTENT_LEN {
            return Err(DomainError::ContentTooLong {
                max: MAX_CONTENT_LEN,
            });
        }

        let id = MessageId::new(self.next_message_id.fetch_add(1, Ordering::SeqCst));
        let message = Message::new(id, chat_id, sender_id, content.to_string());
        self.messages
            .entry(chat_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn add_member(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()> {
        self.check_available()?;
        if !self.chats.contains_key(&chat_id) {
            return Err(DomainError::ChatNotFound(chat_id));
        }
        let inserted = self.members.entry(chat_id).or_default().insert(user_id);
        if inserted {
            Ok(())
        } else {
            Err(DomainError::AlreadyMember { chat_id, user_id })
        }
    }

    async fn remove_member(&self, chat_id: ChatId, user_id: UserId) -> StoreResult<()> {
        self.check_available()?;
        if !self.chats.contains_key(&chat_id) {
            return Err(DomainError::ChatNotFound(chat_id));
        }
        let removed = self
            .members
            .get_mut(&chat_id)
            .is_some_and(|mut set| set.remove(&user_id));
        if removed {
            Ok(())
        } else {
            Err(DomainError::NotAMember { chat_id, user_id })
        }
    }
}
