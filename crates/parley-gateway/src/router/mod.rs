//! Event routing
//!
//! Fans typed realtime events out to the live connections of exactly the
//! right set of users.

mod router;
mod typing;

pub use router::{deliver_to_user, EventRouter};
pub use typing::TypingTracker;
