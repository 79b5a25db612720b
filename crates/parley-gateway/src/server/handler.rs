//! WebSocket handler
//!
//! Accepts upgraded connections, pumps frames in both directions, and tears
//! the registry entry down when the transport goes away.

use crate::handlers::EventDispatcher;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::registry::Connection;
use crate::server::RealtimeState;
use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

/// WebSocket gateway handler
pub async fn socket_handler(
    State(state): State<RealtimeState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: RealtimeState, socket: axum::extract::ws::WebSocket) {
    // Create the outbound channel and register the connection
    let (tx, mut rx) = tokio::sync::mpsc::channel::<ServerEvent>(state.config().realtime.send_buffer);
    let connection = state.registry().register(tx);
    let connection_id = connection.id();

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Task: client frames in
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(frame) = ws_stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    handle_text_frame(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        connection_id = %connection_recv.id(),
                        "Binary frames not supported"
                    );
                    let _ = connection_recv.try_send(ServerEvent::error("binary frames not supported"));
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    tracing::trace!(connection_id = %connection_recv.id(), "Ping/pong");
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %connection_recv.id(), "Client closed connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_recv.id(),
                        error = %e,
                        "WebSocket error"
                    );
                    break;
                }
            }
        }
    });

    // Task: routed events out
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event.to_json() {
                Ok(json) => {
                    if ws_sink.send(Message::Text(json.into())).await.is_err() {
                        tracing::debug!(
                            connection_id = %connection_id,
                            "Failed to write to WebSocket"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %connection_id,
                        error = %e,
                        "Failed to serialize server event"
                    );
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Either direction ending tears the connection down
    tokio::select! {
        _ = recv_task => {
            tracing::debug!(connection_id = %connection_id, "Receive task ended");
        }
        _ = send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task ended");
        }
    }

    cleanup_connection(&state, &connection);
}

/// Handle a text frame from the client
async fn handle_text_frame(state: &RealtimeState, connection: &Arc<Connection>, text: &str) {
    let event = match ClientEvent::from_json(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Failed to parse client frame"
            );
            let _ = connection.try_send(ServerEvent::error("malformed event"));
            return;
        }
    };

    // A failed action answers this connection only; the connection and the
    // rest of the fan-out are unaffected.
    if let Err(e) = EventDispatcher::dispatch(state, connection, event).await {
        if e.is_transient() {
            tracing::warn!(
                connection_id = %connection.id(),
                error = %e,
                "Client action failed (transient)"
            );
        } else {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Client action rejected"
            );
        }
        let _ = connection.try_send(ServerEvent::error(e.user_message()));
    }
}

/// Remove a connection from the registry and announce the presence
/// transition, registry first
fn cleanup_connection(state: &RealtimeState, connection: &Arc<Connection>) {
    tracing::info!(connection_id = %connection.id(), "Cleaning up connection");

    if let Some(outcome) = state.registry().unregister(connection.id()) {
        if let Some(user_id) = outcome.user {
            state
                .presence()
                .connection_closed(user_id, outcome.user_went_offline);
        }
    }
}
