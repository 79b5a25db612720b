//! # parley-gateway
//!
//! WebSocket gateway for real-time bidirectional communication: connection
//! registry, room membership tracking, event fan-out, typing and presence
//! signals, and session reconciliation against the authoritative chat store.

pub mod handlers;
pub mod presence;
pub mod protocol;
pub mod reconcile;
pub mod registry;
pub mod rooms;
pub mod router;
pub mod server;

pub use server::{create_app, create_state, run, RealtimeState, ServerError};
