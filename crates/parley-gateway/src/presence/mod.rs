//! Presence tracking
//!
//! Online/offline is derived purely from connection-count transitions the
//! registry reports; this component exists only to turn those transitions
//! into routed events, decoupled from the registry's bookkeeping. A user is
//! online iff at least one live connection is bound to them.

use crate::router::EventRouter;
use parley_core::{RealtimeEvent, UserId};
use std::sync::Arc;

/// Publishes presence transitions through the event router
pub struct PresenceTracker {
    router: Arc<EventRouter>,
}

impl PresenceTracker {
    /// Create a new tracker
    pub fn new(router: Arc<EventRouter>) -> Self {
        Self { router }
    }

    /// Called after a successful identify
    ///
    /// `came_online` is the registry's report that this was the user's first
    /// live connection; further connections of the same user announce
    /// nothing.
    pub fn connection_identified(&self, user_id: UserId, came_online: bool) {
        if came_online {
            tracing::debug!(user_id = %user_id, "User came online");
            self.router.route(RealtimeEvent::PresenceChanged {
                user_id,
                online: true,
            });
        }
    }

    /// Called after a connection is unregistered
    ///
    /// When the last connection goes, any typing state the user left behind
    /// is stopped for the remaining subscribers before the offline
    /// transition is announced.
    pub fn connection_closed(&self, user_id: UserId, went_offline: bool) {
        if went_offline {
            for chat_id in self.router.typing().chats_for(user_id) {
                self.router.route(RealtimeEvent::TypingChanged {
                    chat_id,
                    user_id,
                    is_typing: false,
                });
            }

            tracing::debug!(user_id = %user_id, "User went offline");
            self.router.route(RealtimeEvent::PresenceChanged {
                user_id,
                online: false,
            });
        }
    }
}

impl std::fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceTracker").finish()
    }
}
