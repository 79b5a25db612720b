//! Test helpers for integration tests
//!
//! Spawns gateway instances on ephemeral ports and wraps the WebSocket
//! client side so tests read as scenarios.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use parley_common::{AppConfig, AppSettings, Environment, RealtimeConfig, ServerConfig};
use parley_core::UserId;
use parley_gateway::protocol::{ClientEvent, ServerEvent};
use parley_gateway::{create_app, create_state, RealtimeState};
use parley_memstore::{MemoryChatStore, MemoryDirectory};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Default timeout for expecting an event
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Typing window used by test servers; kept short so expiry tests run fast
pub const TYPING_WINDOW: Duration = Duration::from_millis(200);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryChatStore>,
    pub directory: Arc<MemoryDirectory>,
    pub state: RealtimeState,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a gateway on an ephemeral port over fresh in-memory stores
    pub async fn start() -> Result<Self> {
        let store = Arc::new(MemoryChatStore::new());
        let directory = Arc::new(MemoryDirectory::new());

        let config = AppConfig {
            app: AppSettings {
                name: "parley-test".to_string(),
                env: Environment::Development,
            },
            gateway: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            realtime: RealtimeConfig {
                typing_expiry_ms: TYPING_WINDOW.as_millis() as u64,
                reconcile_retry_ms: 50,
                send_buffer: 64,
            },
        };

        let state = create_state(config, directory.clone(), store.clone());
        let app = create_app(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .context("binding test listener")?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            store,
            directory,
            state,
            _handle: handle,
        })
    }

    /// WebSocket URL of this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}/socket", self.addr)
    }

    /// Base HTTP URL of this server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Open a raw, unidentified client connection
    pub async fn connect(&self) -> Result<WsClient> {
        let (stream, _) = connect_async(self.ws_url())
            .await
            .context("connecting test client")?;
        Ok(WsClient { stream })
    }

    /// Open a connection and identify it, consuming the identify replies
    pub async fn connect_as(&self, user_id: UserId) -> Result<WsClient> {
        let mut client = self.connect().await?;
        client.identify(user_id).await?;
        Ok(client)
    }
}

/// One WebSocket client connection
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Send a client event
    pub async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let json = event.to_json()?;
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Send a raw text frame (for protocol-abuse tests)
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string().into())).await?;
        Ok(())
    }

    /// Receive the next server event, with a timeout
    pub async fn recv(&mut self) -> Result<ServerEvent> {
        let deadline = tokio::time::sleep(RECV_TIMEOUT);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                frame = self.stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            return ServerEvent::from_json(&text)
                                .with_context(|| format!("parsing server frame: {text}"));
                        }
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                        Some(Ok(Message::Close(_))) | None => bail!("connection closed"),
                        Some(Ok(other)) => bail!("unexpected frame: {other:?}"),
                        Some(Err(e)) => return Err(e.into()),
                    }
                }
                () = &mut deadline => bail!("timed out waiting for server event"),
            }
        }
    }

    /// Receive events until one with the given wire name arrives
    ///
    /// Diagnostic `debug` events and unrelated traffic are skipped.
    pub async fn recv_named(&mut self, name: &str) -> Result<ServerEvent> {
        for _ in 0..32 {
            let event = self.recv().await?;
            if event.name() == name {
                return Ok(event);
            }
        }
        Err(anyhow!("no {name} event within 32 frames"))
    }

    /// Assert that nothing arrives for `window` (debug frames excluded)
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        let deadline = tokio::time::sleep(window);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                frame = self.stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            let event = ServerEvent::from_json(&text)?;
                            if !matches!(event, ServerEvent::Debug { .. }) {
                                bail!("expected silence, got {event:?}");
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(()),
                    }
                }
                () = &mut deadline => return Ok(()),
            }
        }
    }

    /// Identify and consume the debug echo + onlineUsers snapshot
    pub async fn identify(&mut self, user_id: UserId) -> Result<Vec<UserId>> {
        self.send(&ClientEvent::Identify { user_id }).await?;
        match self.recv_named("onlineUsers").await? {
            ServerEvent::OnlineUsers(users) => Ok(users),
            other => bail!("expected onlineUsers, got {other:?}"),
        }
    }

    /// Close the connection
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await.ok();
        Ok(())
    }
}
