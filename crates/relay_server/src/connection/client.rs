//! Client connection representation.

use crate::connection::ConnectionId;
use axum::extract::ws::Message;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Represents an individual client connection to the server.
///
/// Holds the sending half of the connection's bounded outbound queue. The
/// writer task owned by the transport drains the other half onto the socket,
/// so queueing a frame here never waits on the network.
#[derive(Debug)]
pub struct ClientConnection {
    pub id: ConnectionId,

    /// The remote network address of the client
    pub remote_addr: SocketAddr,

    /// When this connection was established
    connected_at: Instant,

    outbound: mpsc::Sender<Message>,
}

impl ClientConnection {
    pub fn new(id: ConnectionId, remote_addr: SocketAddr, outbound: mpsc::Sender<Message>) -> Self {
        Self {
            id,
            remote_addr,
            connected_at: Instant::now(),
            outbound,
        }
    }

    /// How long the connection has been open.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Queues a frame for the writer task without waiting.
    ///
    /// Fails when the queue is full (the client is not reading) or when the
    /// writer has gone.
    pub fn queue(&self, message: Message) -> Result<(), TrySendError<Message>> {
        self.outbound.try_send(message)
    }
}
