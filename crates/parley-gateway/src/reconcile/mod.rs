//! Session reconciliation
//!
//! Runs once per successful identify: fetches the user's authoritative chat
//! memberships and aligns the room tracker with them. This is the only path
//! allowed to add subscriptions that were not triggered by a live
//! membership event, and it only adds ones the store just confirmed.

use crate::registry::ConnectionRegistry;
use crate::rooms::{ReconcileOutcome, RoomTracker};
use parley_core::{ChatId, ChatStore, DomainError, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Reconciles in-memory room subscriptions against persisted membership
pub struct SessionReconciler {
    store: Arc<dyn ChatStore>,
    rooms: Arc<RoomTracker>,
    registry: Arc<ConnectionRegistry>,
    retry_delay: Duration,
}

impl SessionReconciler {
    /// Create a new reconciler
    pub fn new(
        store: Arc<dyn ChatStore>,
        rooms: Arc<RoomTracker>,
        registry: Arc<ConnectionRegistry>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            store,
            rooms,
            registry,
            retry_delay,
        }
    }

    /// Reconcile one user's subscriptions now
    ///
    /// The membership list is fetched at call time, never cached: the
    /// authoritative set must postdate any membership mutation this run is
    /// reconciling against, or a membership event that raced ahead would be
    /// reverted.
    pub async fn run(&self, user_id: UserId) -> Result<ReconcileOutcome, DomainError> {
        let chats = self.store.list_chats_for_user(user_id).await?;
        let authoritative: HashSet<ChatId> = chats.into_iter().collect();
        Ok(self.rooms.reconcile(user_id, &authoritative))
    }

    /// Keep retrying a failed reconcile on a timer
    ///
    /// A store outage must not tear the connection down; the user stays
    /// identified with stale-or-empty subscriptions until a retry lands.
    /// Retries stop when the user has no live connection left.
    pub fn spawn_retry(&self, user_id: UserId) {
        let store = Arc::clone(&self.store);
        let rooms = Arc::clone(&self.rooms);
        let registry = Arc::clone(&self.registry);
        let delay = self.retry_delay;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(delay).await;

                if !registry.is_online(user_id) {
                    tracing::debug!(user_id = %user_id, "User gone, abandoning reconcile retries");
                    return;
                }

                match store.list_chats_for_user(user_id).await {
                    Ok(chats) => {
                        let authoritative: HashSet<ChatId> = chats.into_iter().collect();
                        let outcome = rooms.reconcile(user_id, &authoritative);
                        tracing::info!(
                            user_id = %user_id,
                            added = outcome.added.len(),
                            removed = outcome.removed.len(),
                            "Reconcile retry succeeded"
                        );
                        return;
                    }
                    Err(e) if e.is_retryable() => {
                        tracing::warn!(user_id = %user_id, error = %e, "Reconcile retry failed");
                    }
                    Err(e) => {
                        tracing::error!(user_id = %user_id, error = %e, "Reconcile failed permanently");
                        return;
                    }
                }
            }
        });
    }
}

impl std::fmt::Debug for SessionReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionReconciler")
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}
