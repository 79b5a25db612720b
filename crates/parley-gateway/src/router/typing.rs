//! Transient typing state
//!
//! (chat, user) entries with a generation stamp. Each refresh bumps the
//! generation; an expiry task only clears the entry it armed, so a refresh
//! racing an expiry never loses the newer state. Nothing here is persisted.

use dashmap::DashMap;
use parley_core::{ChatId, UserId};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks who is currently typing where
#[derive(Debug, Default)]
pub struct TypingTracker {
    active: DashMap<(ChatId, UserId), u64>,
    generation: AtomicU64,
}

impl TypingTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new tracker wrapped in Arc
    #[must_use]
    pub fn new_shared() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::new())
    }

    /// Mark a user as typing; returns the generation the caller should pass
    /// to [`clear_if_current`](Self::clear_if_current) when the window ends
    pub fn arm(&self, chat_id: ChatId, user_id: UserId) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.active.insert((chat_id, user_id), generation);
        generation
    }

    /// Clear a typing entry unconditionally (explicit stop)
    pub fn clear(&self, chat_id: ChatId, user_id: UserId) -> bool {
        self.active.remove(&(chat_id, user_id)).is_some()
    }

    /// Clear a typing entry only if it still belongs to `generation`
    ///
    /// Returns false when a refresh superseded the armed entry, in which
    /// case the caller must not synthesize a stop.
    pub fn clear_if_current(&self, chat_id: ChatId, user_id: UserId, generation: u64) -> bool {
        self.active
            .remove_if(&(chat_id, user_id), |_, &current| current == generation)
            .is_some()
    }

    /// Check whether a user is marked as typing in a chat
    pub fn is_typing(&self, chat_id: ChatId, user_id: UserId) -> bool {
        self.active.contains_key(&(chat_id, user_id))
    }

    /// Chats where a user is currently marked as typing
    pub fn chats_for(&self, user_id: UserId) -> Vec<ChatId> {
        self.active
            .iter()
            .filter(|entry| entry.key().1 == user_id)
            .map(|entry| entry.key().0)
            .collect()
    }

    /// Number of active typing entries
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
