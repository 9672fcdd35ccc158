//! Error types for the relay server.
//!
//! Nothing in the relay core is fatal. Most failure modes (malformed payloads,
//! stale connections, double closes) are absorbed where they occur and never
//! become a `ServerError` at all. The variants below cover what remains:
//! listener setup, per-target delivery and serialization.

use crate::connection::ConnectionId;
use thiserror::Error;

/// Errors produced by the relay server and its transport.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Socket creation, binding or serving failures
    #[error("Network error: {0}")]
    Network(String),

    /// A payload could not be queued for a single target connection
    #[error("Send to connection {connection} failed: {reason}")]
    Send {
        connection: ConnectionId,
        reason: String,
    },

    /// An outbound message could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServerError {
    pub(crate) fn send(connection: ConnectionId, reason: impl Into<String>) -> Self {
        Self::Send {
            connection,
            reason: reason.into(),
        }
    }
}
