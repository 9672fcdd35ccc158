//! Outbound delivery seam between the relay core and the transport.

use super::ConnectionId;
use crate::error::ServerError;

/// Delivers serialized payloads to individual connections.
///
/// Implementations must not block: the relay core calls `send` while holding
/// the registry lock, once per target of a fan-out. An error only concerns
/// the one target it was raised for.
pub trait ClientSender: Send + Sync {
    fn send(&self, connection: ConnectionId, text: &str) -> Result<(), ServerError>;
}

impl<T: ClientSender + ?Sized> ClientSender for std::sync::Arc<T> {
    fn send(&self, connection: ConnectionId, text: &str) -> Result<(), ServerError> {
        (**self).send(connection, text)
    }
}
