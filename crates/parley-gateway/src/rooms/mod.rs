//! Room membership tracking
//!
//! The routing-level view of which users should receive each chat's events.

mod tracker;

pub use tracker::{ReconcileOutcome, RoomTracker};
