//! Connection manager.
//!
//! Owns the table of live connections keyed by handle. The manager is the
//! transport side of the relay: it issues handles, holds each connection's
//! outbound queue and implements [`ClientSender`] for the relay core.

use super::client::ClientConnection;
use super::{ClientSender, ConnectionId};
use crate::error::ServerError;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// Outbound queue length used by [`ConnectionManager::new`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Tracks live WebSocket connections and their outbound queues.
#[derive(Debug)]
pub struct ConnectionManager {
    connections: DashMap<ConnectionId, ClientConnection>,
    next_id: AtomicUsize,
    queue_capacity: usize,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates a manager whose per-connection queues hold at most
    /// `capacity` frames. A capacity of zero is raised to one.
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicUsize::new(1),
            queue_capacity: capacity.max(1),
        }
    }

    /// Registers a new connection and returns its fresh handle together with
    /// the receiving half of its outbound queue.
    pub fn add_connection(&self, remote_addr: SocketAddr) -> (ConnectionId, mpsc::Receiver<Message>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        self.connections
            .insert(id, ClientConnection::new(id, remote_addr, tx));
        debug!("Connection {} registered for {}", id, remote_addr);
        (id, rx)
    }

    /// Forgets a connection. Dropping the returned entry closes its outbound
    /// queue, which lets the writer task finish.
    pub fn remove_connection(&self, id: ConnectionId) -> Option<ClientConnection> {
        self.connections.remove(&id).map(|(_, connection)| connection)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Queues a Close frame on every live connection.
    pub fn shutdown_all(&self) {
        for entry in self.connections.iter() {
            if entry.value().queue(Message::Close(None)).is_err() {
                debug!("Could not queue close for connection {}", entry.key());
            }
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSender for ConnectionManager {
    fn send(&self, connection: ConnectionId, text: &str) -> Result<(), ServerError> {
        let entry = self
            .connections
            .get(&connection)
            .ok_or_else(|| ServerError::send(connection, "not connected"))?;
        entry
            .queue(Message::Text(text.to_owned()))
            .map_err(|e| match e {
                TrySendError::Full(_) => ServerError::send(connection, "outbound queue full"),
                TrySendError::Closed(_) => ServerError::send(connection, "outbound queue closed"),
            })
    }
}
