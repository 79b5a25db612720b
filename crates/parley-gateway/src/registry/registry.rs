//! Connection registry
//!
//! Concurrency discipline: the connection table is a `DashMap`; the
//! user-to-connections index is guarded by one mutex. `unregister` removes
//! the connection from the table *before* touching the index, and `identify`
//! re-checks the table while holding the index lock. Together these rules
//! keep a connection out of two users' sets and keep online/offline
//! transitions balanced when an identify races a disconnect.

use super::Connection;
use crate::protocol::ServerEvent;
use dashmap::DashMap;
use parking_lot::Mutex;
use parley_core::{ConnectionId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Registry error type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The referenced connection is not (or no longer) registered
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    /// The connection already carries an identity
    #[error("Connection {0} is already identified")]
    AlreadyIdentified(ConnectionId),
}

/// Result of a successful identify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identified {
    /// True if this was the user's first live connection
    pub user_came_online: bool,
}

/// Result of unregistering a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unregistered {
    /// The identity the connection was bound to, if it was identified
    pub user: Option<UserId>,
    /// True if this was the user's last live connection
    pub user_went_offline: bool,
}

/// Tracks all live connections and the user each is bound to
pub struct ConnectionRegistry {
    /// Live connections by connection ID
    connections: DashMap<ConnectionId, Arc<Connection>>,

    /// User ID to connection IDs index
    by_user: Mutex<HashMap<UserId, HashSet<ConnectionId>>>,

    /// Next connection ID (never reused within a process)
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    /// Create a new registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            by_user: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Admit a new, not-yet-identified connection
    ///
    /// No presence side effect; an unidentified connection is invisible to
    /// routing.
    pub fn register(&self, sender: mpsc::Sender<ServerEvent>) -> Arc<Connection> {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let connection = Connection::new(id, sender);
        self.connections.insert(id, connection.clone());

        tracing::debug!(connection_id = %id, "Connection registered");

        connection
    }

    /// Bind a connection to a user identity, exactly once
    ///
    /// Returns whether the user just came online so the presence tracker can
    /// announce the transition.
    pub fn identify(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
    ) -> Result<Identified, RegistryError> {
        let connection = self
            .connections
            .get(&connection_id)
            .map(|c| c.clone())
            .ok_or(RegistryError::UnknownConnection(connection_id))?;

        connection
            .bind_user(user_id)
            .map_err(|_| RegistryError::AlreadyIdentified(connection_id))?;

        let mut by_user = self.by_user.lock();

        // A disconnect may have raced the binding. Unregister removes the
        // connection from the table before it takes this lock, so a missing
        // entry here means the teardown path will never see the binding and
        // the index must not be touched.
        if !self.connections.contains_key(&connection_id) {
            return Err(RegistryError::UnknownConnection(connection_id));
        }

        let set = by_user.entry(user_id).or_default();
        let user_came_online = set.is_empty();
        set.insert(connection_id);

        tracing::debug!(
            connection_id = %connection_id,
            user_id = %user_id,
            came_online = user_came_online,
            "Connection identified"
        );

        Ok(Identified { user_came_online })
    }

    /// Current live connections for a user; empty if offline or unknown
    pub fn connections_for(&self, user_id: UserId) -> Vec<Arc<Connection>> {
        let ids = self.connection_ids_for(user_id);
        ids.iter()
            .filter_map(|id| self.connections.get(id).map(|c| c.clone()))
            .collect()
    }

    /// Current live connection IDs for a user
    pub fn connection_ids_for(&self, user_id: UserId) -> HashSet<ConnectionId> {
        self.by_user
            .lock()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Get a connection by ID
    pub fn get(&self, connection_id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.get(&connection_id).map(|c| c.clone())
    }

    /// Remove a connection; idempotent
    ///
    /// Returns `None` if the ID was already gone. Reports whether the owning
    /// user just went offline so the presence tracker can announce it.
    pub fn unregister(&self, connection_id: ConnectionId) -> Option<Unregistered> {
        // Table first, index second: see the module-level discipline.
        let (_, connection) = self.connections.remove(&connection_id)?;
        let user = connection.user();

        let mut user_went_offline = false;
        if let Some(user_id) = user {
            let mut by_user = self.by_user.lock();
            if let Some(set) = by_user.get_mut(&user_id) {
                if set.remove(&connection_id) && set.is_empty() {
                    by_user.remove(&user_id);
                    user_went_offline = true;
                }
            }
        }

        tracing::debug!(
            connection_id = %connection_id,
            user_id = ?user,
            went_offline = user_went_offline,
            "Connection unregistered"
        );

        Some(Unregistered {
            user,
            user_went_offline,
        })
    }

    /// Check whether a user has at least one live connection
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.by_user
            .lock()
            .get(&user_id)
            .is_some_and(|set| !set.is_empty())
    }

    /// Users with at least one live connection
    pub fn online_users(&self) -> Vec<UserId> {
        self.by_user.lock().keys().copied().collect()
    }

    /// Total number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of distinct identified users
    pub fn user_count(&self) -> usize {
        self.by_user.lock().len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("users", &self.by_user.lock().len())
            .finish()
    }
}
