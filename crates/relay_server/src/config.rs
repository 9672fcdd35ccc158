//! Server configuration types and defaults.
//!
//! This module contains the server configuration structure and default values
//! used to initialize the relay server.

use std::net::SocketAddr;

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 8181;

/// Configuration structure for the relay server.
///
/// Contains the network settings needed to bind the listener and the limits
/// applied to incoming connections.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrently registered players
    pub max_connections: usize,

    /// Frames buffered per connection before further sends to it fail
    pub outbound_queue_capacity: usize,
}

impl ServerConfig {
    /// Builds a configuration listening on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], port)),
            ..Default::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_connections: 1000,
            outbound_queue_capacity: 256,
        }
    }
}
