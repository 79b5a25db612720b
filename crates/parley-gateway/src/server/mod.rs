//! Gateway server setup
//!
//! Provides the WebSocket server configuration and routes.

mod handler;
mod state;


pub use handler::socket_handler;
pub use state::RealtimeState;

use axum::{routing::get, Router};
use parley_common::AppConfig;
use parley_core::{ChatStore, UserDirectory};
use parley_memstore::{MemoryChatStore, MemoryDirectory};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Create the gateway router
pub fn create_router() -> Router<RealtimeState> {
    Router::new()
        .route("/socket", get(socket_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: RealtimeState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire the realtime components around the given collaborators
pub fn create_state(
    config: AppConfig,
    directory: Arc<dyn UserDirectory>,
    store: Arc<dyn ChatStore>,
) -> RealtimeState {
    RealtimeState::new(config, directory, store)
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    tracing::info!("Starting gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    tracing::info!("Gateway listening on ws://{}/socket", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the complete gateway server with configuration
///
/// Wires the in-memory collaborators; a deployment with real persistence
/// passes its own `UserDirectory`/`ChatStore` through `create_state`.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));

    let directory: Arc<dyn UserDirectory> = Arc::new(MemoryDirectory::new());
    let store: Arc<dyn ChatStore> = Arc::new(MemoryChatStore::new());

    let state = create_state(config, directory, store);
    let app = create_app(state);

    run_server(app, addr).await
}
