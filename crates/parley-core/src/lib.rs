//! # parley-core
//!
//! Domain layer containing identifier types, entities, collaborator traits,
//! and the realtime event model. This crate has zero dependencies on
//! infrastructure (web framework, storage engines, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{Chat, ChatKind, Message, User};
pub use error::DomainError;
pub use events::{MembershipAction, RealtimeEvent};
pub use ids::{ChatId, ConnectionId, IdParseError, MessageId, UserId};
pub use traits::{ChatStore, StoreResult, UserDirectory};
