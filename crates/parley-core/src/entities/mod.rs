//! Domain entities - core business objects
//!
//! Users, chats, and messages are owned by the external persistence
//! collaborators; the realtime layer only references them.

mod chat;
mod message;
mod user;

pub use chat::{Chat, ChatKind};
pub use message::{Message, MAX_CONTENT_LEN};
pub use user::User;
