//! Join/leave room handlers

use super::{HandlerError, HandlerResult};
use crate::protocol::ServerEvent;
use crate::registry::Connection;
use crate::server::RealtimeState;
use parley_core::ChatId;
use std::sync::Arc;

/// Handles explicit `joinRoom` / `leaveRoom` events
///
/// Clients send these defensively beside the automatic reconcile. A join is
/// only honored after the authoritative store confirms membership; a
/// subscription must never exist for a non-member.
pub struct RoomHandler;

impl RoomHandler {
    /// Handle a `joinRoom` event
    pub async fn join(
        state: &RealtimeState,
        connection: &Arc<Connection>,
        chat_id: ChatId,
    ) -> HandlerResult<()> {
        let user_id = connection.user().ok_or(HandlerError::NotIdentified)?;

        let members = state.store().list_members(chat_id).await?;
        if !members.contains(&user_id) {
            return Err(HandlerError::NotAMember(chat_id));
        }

        state.rooms().subscribe(chat_id, user_id);
        let _ = connection.try_send(ServerEvent::debug(format!("Joined room {chat_id}")));

        Ok(())
    }

    /// Handle a `leaveRoom` event
    pub fn leave(
        state: &RealtimeState,
        connection: &Arc<Connection>,
        chat_id: ChatId,
    ) -> HandlerResult<()> {
        let user_id = connection.user().ok_or(HandlerError::NotIdentified)?;

        state.rooms().unsubscribe(chat_id, user_id);
        let _ = connection.try_send(ServerEvent::debug(format!("Left room {chat_id}")));

        Ok(())
    }
}
