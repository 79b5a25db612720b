//! Typing handler

use super::{HandlerError, HandlerResult};
use crate::registry::Connection;
use crate::server::RealtimeState;
use parley_core::{ChatId, RealtimeEvent, UserId};
use std::sync::Arc;

/// Handles `typing` events
pub struct TypingHandler;

impl TypingHandler {
    /// Route a typing signal from an identified connection
    ///
    /// The payload identity must match the connection's binding, and the
    /// user must hold a routing subscription for the chat; neither check
    /// touches the store.
    pub fn handle(
        state: &RealtimeState,
        connection: &Arc<Connection>,
        chat_id: ChatId,
        user_id: UserId,
        is_typing: bool,
    ) -> HandlerResult<()> {
        let bound = connection.user().ok_or(HandlerError::NotIdentified)?;
        if bound != user_id {
            return Err(HandlerError::IdentityMismatch);
        }

        if !state.rooms().is_subscribed(chat_id, user_id) {
            return Err(HandlerError::NotAMember(chat_id));
        }

        state.router().route(RealtimeEvent::TypingChanged {
            chat_id,
            user_id,
            is_typing,
        });

        Ok(())
    }
}
