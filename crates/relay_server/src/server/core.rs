//! Core relay server implementation.
//!
//! This module contains the `RelayServer` struct: it binds the listener and
//! serves the axum router, which sends `/health` to the health route and
//! upgrades every other request to a WebSocket driving the shared [`Relay`].

use super::{handlers::websocket_handler, health, RelayState};
use crate::{config::ServerConfig, connection::ConnectionManager, error::ServerError, session::Relay};
use axum::{routing::get, Router};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

/// Backlog passed to `listen(2)`.
const LISTEN_BACKLOG: i32 = 1024;

/// The relay server.
///
/// Owns the relay core and the transport around it. The server can be started
/// in one step with [`RelayServer::start`], or bound first with
/// [`RelayServer::bind`] and run with [`RelayServer::serve`] when the caller
/// needs the bound address (for example when binding port 0).
pub struct RelayServer {
    /// Server configuration settings
    config: Arc<ServerConfig>,

    /// Registry and broadcast engine, delivering through the connection manager
    relay: Arc<Relay<ConnectionManager>>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl RelayServer {
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_sender, _) = broadcast::channel(1);
        let connections = ConnectionManager::with_queue_capacity(config.outbound_queue_capacity);
        Self {
            config: Arc::new(config),
            relay: Arc::new(Relay::new(connections)),
            shutdown_sender,
        }
    }

    /// Binds the listener and serves until shutdown.
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = self.bind()?;
        self.serve(listener).await
    }

    /// Creates the TCP listener for the configured bind address.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.bind_address;
        let socket = Socket::new(Domain::for_address(address), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::Network(format!("Socket creation failed: {e}")))?;
        socket.set_reuse_address(true).ok();

        socket
            .bind(&address.into())
            .map_err(|e| ServerError::Network(format!("Bind failed: {e}")))?;
        socket
            .listen(LISTEN_BACKLOG)
            .map_err(|e| ServerError::Network(format!("Listen failed: {e}")))?;

        let std_listener: StdTcpListener = socket.into();
        std_listener
            .set_nonblocking(true)
            .map_err(|e| ServerError::Network(format!("Set nonblocking failed: {e}")))?;

        let listener = TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::Network(format!("Tokio listener creation failed: {e}")))?;

        info!("✅ Listener bound on {}", address);
        Ok(listener)
    }

    /// Routes `GET /health` to the health check and upgrades every other
    /// request to a relay WebSocket.
    pub fn router(&self) -> Router {
        let state = RelayState {
            relay: self.relay.clone(),
            config: self.config.clone(),
        };
        Router::new()
            .route(health::HEALTH_PATH, get(health::health_handler))
            .fallback(websocket_handler)
            .with_state(state)
    }

    /// Serves connections on `listener` until [`RelayServer::shutdown`] is
    /// called. Every live connection is sent a Close frame on the way out.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        if let Ok(address) = listener.local_addr() {
            info!("🚀 Relay server accepting connections on {}", address);
        }

        let relay = self.relay.clone();
        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_receiver.recv().await;
                info!("🧹 Closing {} connection(s)", relay.sender().connection_count());
                relay.sender().shutdown_all();
            })
            .await
            .map_err(|e| ServerError::Network(format!("Server error: {e}")))?;

        info!("Server stopped");
        Ok(())
    }

    /// Signals the server to stop accepting and close every client.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Gets the relay core, e.g. to read the current player count.
    pub fn relay(&self) -> Arc<Relay<ConnectionManager>> {
        self.relay.clone()
    }

    pub async fn player_count(&self) -> usize {
        self.relay.player_count().await
    }
}
