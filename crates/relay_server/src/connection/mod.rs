//! Connection management for client connections.
//!
//! This module tracks live WebSocket connections, owns their outbound queues
//! and exposes the `send(handle, text)` operation the relay core fans out
//! through.

pub mod client;
pub mod manager;
pub mod sender;

pub use manager::ConnectionManager;
pub use sender::ClientSender;

/// Type alias for connection identifiers.
///
/// Handles are issued from a monotonically increasing counter and are never
/// reused while the process runs.
pub type ConnectionId = usize;
