//! Client event handlers
//!
//! Dispatches parsed wire events to the handler for each action.

mod error;
mod identify;
mod message;
mod rooms;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use identify::IdentifyHandler;
pub use message::MessageHandler;
pub use rooms::RoomHandler;
pub use typing::TypingHandler;

use crate::protocol::ClientEvent;
use crate::registry::Connection;
use crate::server::RealtimeState;
use std::sync::Arc;

/// Dispatch incoming client events to the appropriate handler
pub struct EventDispatcher;

impl EventDispatcher {
    /// Handle one incoming client event
    pub async fn dispatch(
        state: &RealtimeState,
        connection: &Arc<Connection>,
        event: ClientEvent,
    ) -> HandlerResult<()> {
        tracing::trace!(
            connection_id = %connection.id(),
            event = event.name(),
            "Dispatching client event"
        );

        match event {
            ClientEvent::Identify { user_id } => {
                IdentifyHandler::handle(state, connection, user_id).await
            }
            ClientEvent::JoinRoom { chat_id } => {
                RoomHandler::join(state, connection, chat_id).await
            }
            ClientEvent::LeaveRoom { chat_id } => RoomHandler::leave(state, connection, chat_id),
            ClientEvent::Typing {
                chat_id,
                user_id,
                is_typing,
            } => TypingHandler::handle(state, connection, chat_id, user_id, is_typing),
            ClientEvent::SendMessage {
                chat_id,
                sender_id,
                content,
            } => MessageHandler::handle(state, connection, chat_id, sender_id, &content).await,
        }
    }
}
