//! Gateway state
//!
//! Shared dependencies for the gateway server.

use crate::presence::PresenceTracker;
use crate::reconcile::SessionReconciler;
use crate::registry::ConnectionRegistry;
use crate::rooms::RoomTracker;
use crate::router::{EventRouter, TypingTracker};
use parley_common::AppConfig;
use parley_core::{ChatStore, UserDirectory};
use std::sync::Arc;
use std::time::Duration;

/// Gateway application state
///
/// Holds the realtime components and the collaborator handles. Cheap to
/// clone; every field is shared.
#[derive(Clone)]
pub struct RealtimeState {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTracker>,
    router: Arc<EventRouter>,
    presence: Arc<PresenceTracker>,
    reconciler: Arc<SessionReconciler>,
    directory: Arc<dyn UserDirectory>,
    store: Arc<dyn ChatStore>,
    config: Arc<AppConfig>,
}

impl RealtimeState {
    /// Wire up the realtime components around the given collaborators
    pub fn new(
        config: AppConfig,
        directory: Arc<dyn UserDirectory>,
        store: Arc<dyn ChatStore>,
    ) -> Self {
        let registry = ConnectionRegistry::new_shared();
        let rooms = RoomTracker::new_shared();
        let typing = TypingTracker::new_shared();

        let router = Arc::new(EventRouter::new(
            Arc::clone(&registry),
            Arc::clone(&rooms),
            typing,
            Duration::from_millis(config.realtime.typing_expiry_ms),
        ));
        let presence = Arc::new(PresenceTracker::new(Arc::clone(&router)));
        let reconciler = Arc::new(SessionReconciler::new(
            Arc::clone(&store),
            Arc::clone(&rooms),
            Arc::clone(&registry),
            Duration::from_millis(config.realtime.reconcile_retry_ms),
        ));

        Self {
            registry,
            rooms,
            router,
            presence,
            reconciler,
            directory,
            store,
            config: Arc::new(config),
        }
    }

    /// Get the connection registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Get the room membership tracker
    pub fn rooms(&self) -> &RoomTracker {
        &self.rooms
    }

    /// Get the event router
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Get the presence tracker
    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// Get the session reconciler
    pub fn reconciler(&self) -> &SessionReconciler {
        &self.reconciler
    }

    /// Get the user directory collaborator
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    /// Get the chat store collaborator
    pub fn store(&self) -> &dyn ChatStore {
        self.store.as_ref()
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for RealtimeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeState")
            .field("registry", &self.registry)
            .field("rooms", &self.rooms)
            .finish()
    }
}
