//! Server implementation: listener, HTTP routing, WebSocket connection
//! handling and the health check.

pub mod core;
pub mod handlers;
pub mod health;

pub use self::core::RelayServer;

use crate::{config::ServerConfig, connection::ConnectionManager, session::Relay};
use std::sync::Arc;

/// Shared state handed to every route.
#[derive(Clone)]
pub(crate) struct RelayState {
    pub relay: Arc<Relay<ConnectionManager>>,
    pub config: Arc<ServerConfig>,
}
