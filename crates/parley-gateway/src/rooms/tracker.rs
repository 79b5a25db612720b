//! Room membership tracker
//!
//! Both indexes (chat-to-users and user-to-chats) must always agree, so one
//! rwlock guards them together. Readers take cloned snapshots; fan-out never
//! holds the lock while writing to connections.

use parking_lot::RwLock;
use parley_core::{ChatId, UserId};
use std::collections::{HashMap, HashSet};

/// Result of reconciling one user's subscriptions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Chats the user was newly subscribed to
    pub added: Vec<ChatId>,
    /// Stale subscriptions that were dropped
    pub removed: Vec<ChatId>,
}

impl ReconcileOutcome {
    /// True if reconciliation changed nothing
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Default)]
struct RoomState {
    by_chat: HashMap<ChatId, HashSet<UserId>>,
    by_user: HashMap<UserId, HashSet<ChatId>>,
}

impl RoomState {
    fn insert(&mut self, chat_id: ChatId, user_id: UserId) -> bool {
        let inserted = self.by_chat.entry(chat_id).or_default().insert(user_id);
        self.by_user.entry(user_id).or_default().insert(chat_id);
        inserted
    }

    fn remove(&mut self, chat_id: ChatId, user_id: UserId) -> bool {
        let mut removed = false;
        if let Some(users) = self.by_chat.get_mut(&chat_id) {
            removed = users.remove(&user_id);
            if users.is_empty() {
                self.by_chat.remove(&chat_id);
            }
        }
        if let Some(chats) = self.by_user.get_mut(&user_id) {
            chats.remove(&chat_id);
            if chats.is_empty() {
                self.by_user.remove(&user_id);
            }
        }
        removed
    }
}

/// Per-chat set of users currently subscribed to that chat's events
pub struct RoomTracker {
    state: RwLock<RoomState>,
}

impl RoomTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RoomState::default()),
        }
    }

    /// Create a new tracker wrapped in Arc
    #[must_use]
    pub fn new_shared() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::new())
    }

    /// Subscribe a user to a chat's events; idempotent
    pub fn subscribe(&self, chat_id: ChatId, user_id: UserId) -> bool {
        let inserted = self.state.write().insert(chat_id, user_id);
        if inserted {
            tracing::trace!(chat_id = %chat_id, user_id = %user_id, "Subscribed to room");
        }
        inserted
    }

    /// Unsubscribe a user from a chat's events; idempotent
    pub fn unsubscribe(&self, chat_id: ChatId, user_id: UserId) -> bool {
        let removed = self.state.write().remove(chat_id, user_id);
        if removed {
            tracing::trace!(chat_id = %chat_id, user_id = %user_id, "Unsubscribed from room");
        }
        removed
    }

    /// Snapshot of the users subscribed to a chat
    pub fn subscribers_of(&self, chat_id: ChatId) -> HashSet<UserId> {
        self.state
            .read()
            .by_chat
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of the chats a user is subscribed to
    pub fn chats_of(&self, user_id: UserId) -> HashSet<ChatId> {
        self.state
            .read()
            .by_user
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Check a single subscription
    pub fn is_subscribed(&self, chat_id: ChatId, user_id: UserId) -> bool {
        self.state
            .read()
            .by_chat
            .get(&chat_id)
            .is_some_and(|users| users.contains(&user_id))
    }

    /// Align one user's subscriptions with the authoritative membership set
    ///
    /// Adds what is missing and drops what the store no longer records. Only
    /// this user's rows are touched, so it is safe to run concurrently with
    /// live membership events for other users. Callers must pass a freshly
    /// fetched set: a stale snapshot would revert a membership event that
    /// raced ahead of it.
    pub fn reconcile(&self, user_id: UserId, authoritative: &HashSet<ChatId>) -> ReconcileOutcome {
        let mut state = self.state.write();

        let current = state.by_user.get(&user_id).cloned().unwrap_or_default();

        let mut outcome = ReconcileOutcome::default();
        for &chat_id in authoritative.difference(&current) {
            state.insert(chat_id, user_id);
            outcome.added.push(chat_id);
        }
        for &chat_id in current.difference(authoritative) {
            state.remove(chat_id, user_id);
            outcome.removed.push(chat_id);
        }

        if !outcome.is_noop() {
            tracing::debug!(
                user_id = %user_id,
                added = outcome.added.len(),
                removed = outcome.removed.len(),
                "Reconciled room subscriptions"
            );
        }

        outcome
    }

    /// Number of chats with at least one subscriber
    pub fn room_count(&self) -> usize {
        self.state.read().by_chat.len()
    }
}

impl Default for RoomTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoomTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("RoomTracker")
            .field("rooms", &state.by_chat.len())
            .field("users", &state.by_user.len())
            .finish()
    }
}
