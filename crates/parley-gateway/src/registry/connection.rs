//! Individual client connection
//!
//! Represents a single live connection and its identity binding.

use crate::protocol::ServerEvent;
use parking_lot::RwLock;
use parley_core::{ConnectionId, UserId};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// A single live connection
///
/// Owned by the [`ConnectionRegistry`](super::ConnectionRegistry) from
/// handshake to teardown. The identity binding happens at most once; an
/// unidentified connection receives no routed events.
pub struct Connection {
    /// Unique connection ID (per process lifetime)
    id: ConnectionId,

    /// Bound user identity (None until identify)
    user: RwLock<Option<UserId>>,

    /// Channel to the connection's outbound write task
    sender: mpsc::Sender<ServerEvent>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub(super) fn new(id: ConnectionId, sender: mpsc::Sender<ServerEvent>) -> Arc<Self> {
        Arc::new(Self {
            id,
            user: RwLock::new(None),
            sender,
            created_at: Instant::now(),
        })
    }

    /// Get the connection ID
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Get the bound user identity (if identified)
    pub fn user(&self) -> Option<UserId> {
        *self.user.read()
    }

    /// Check if the connection is identified
    pub fn is_identified(&self) -> bool {
        self.user.read().is_some()
    }

    /// Bind the user identity. Fails if a binding already exists; the
    /// original identity always wins.
    pub(super) fn bind_user(&self, user_id: UserId) -> Result<(), UserId> {
        let mut slot = self.user.write();
        match *slot {
            Some(existing) => Err(existing),
            None => {
                *slot = Some(user_id);
                Ok(())
            }
        }
    }

    /// Push an event to this connection without blocking
    ///
    /// A full buffer or a closed peer is a per-connection failure the caller
    /// skips past; it must never stall delivery to other targets.
    pub fn try_send(
        &self,
        event: ServerEvent,
    ) -> Result<(), mpsc::error::TrySendError<ServerEvent>> {
        self.sender.try_send(event)
    }

    /// Check if the outbound channel is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user", &*self.user.read())
            .finish()
    }
}
