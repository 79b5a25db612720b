//! Identify handler

use super::{HandlerError, HandlerResult};
use crate::protocol::ServerEvent;
use crate::registry::Connection;
use crate::server::RealtimeState;
use parley_core::UserId;
use std::sync::Arc;

/// Handles `identify` events
pub struct IdentifyHandler;

impl IdentifyHandler {
    /// Bind a connection to a user identity
    ///
    /// Sequence: authenticate the claimed id against the user directory,
    /// bind it in the registry, reconcile room subscriptions against the
    /// store, announce presence, then answer the client with a diagnostic
    /// echo and its online-contacts snapshot.
    pub async fn handle(
        state: &RealtimeState,
        connection: &Arc<Connection>,
        user_id: UserId,
    ) -> HandlerResult<()> {
        // The claimed identity must exist before anything is bound
        let user = state
            .directory()
            .lookup_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                HandlerError::AuthenticationFailed(format!("unknown user {user_id}"))
            })?;

        let identified = state.registry().identify(connection.id(), user_id)?;

        // Reconcile before the presence announcement so the contact set is
        // derived from current membership. A store outage leaves the user
        // identified with stale-or-empty subscriptions and a retry pending.
        match state.reconciler().run(user_id).await {
            Ok(outcome) => {
                tracing::debug!(
                    user_id = %user_id,
                    added = outcome.added.len(),
                    removed = outcome.removed.len(),
                    "Session reconciled on identify"
                );
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Reconcile failed on identify, scheduling retry"
                );
                state.reconciler().spawn_retry(user_id);
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Reconcile failed on identify");
            }
        }

        state
            .presence()
            .connection_identified(user_id, identified.user_came_online);

        // Answer with a diagnostic echo and the online-contacts snapshot
        let _ = connection.try_send(ServerEvent::debug(format!("Identified as user {user_id}")));

        let mut online: Vec<UserId> = state
            .router()
            .contacts_of(user_id)
            .into_iter()
            .filter(|&contact| state.registry().is_online(contact))
            .collect();
        online.sort();
        let _ = connection.try_send(ServerEvent::OnlineUsers(online));

        tracing::info!(
            connection_id = %connection.id(),
            user_id = %user_id,
            username = %user.username,
            "Client identified"
        );

        Ok(())
    }
}
