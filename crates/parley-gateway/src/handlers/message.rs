//! Direct message-send handler

use super::{HandlerError, HandlerResult};
use crate::registry::Connection;
use crate::server::RealtimeState;
use parley_core::{ChatId, RealtimeEvent, UserId};
use std::sync::Arc;

/// Handles `sendMessage` events
///
/// Persist-first: the store append is the authoritative act and the fan-out
/// only happens for a message that is already durable. A failed append
/// answers this connection with an `error` event; nothing is broadcast and
/// the connection stays up, so the UI can mark the message as failed.
pub struct MessageHandler;

impl MessageHandler {
    /// Persist a message and fan it out
    pub async fn handle(
        state: &RealtimeState,
        connection: &Arc<Connection>,
        chat_id: ChatId,
        sender_id: UserId,
        content: &str,
    ) -> HandlerResult<()> {
        let bound = connection.user().ok_or(HandlerError::NotIdentified)?;
        if bound != sender_id {
            return Err(HandlerError::IdentityMismatch);
        }

        let message = state
            .store()
            .append_message(chat_id, sender_id, content)
            .await?;

        tracing::debug!(
            chat_id = %chat_id,
            sender_id = %sender_id,
            message_id = %message.id,
            "Message persisted, fanning out"
        );

        state
            .router()
            .route(RealtimeEvent::MessageCreated { chat_id, message });

        Ok(())
    }
}
