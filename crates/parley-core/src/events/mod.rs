//! Realtime events - the typed inputs of the event router

mod realtime_event;

pub use realtime_event::{MembershipAction, RealtimeEvent};
