//! # Relay Server - Real-Time Player State Relay
//!
//! A WebSocket server that assigns every connecting client an identity and a
//! 3D position, and fans out position updates and chat lines to its peers.
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Message Codec** ([`messaging::codec`]) - JSON wire format, decoded by a
//!   single dispatch on the `type` discriminator
//! * **Player Registry** ([`registry`]) - connection handle to player state
//! * **Session Lifecycle** ([`session`]) - join/leave announcement protocol
//! * **Broadcast Router** ([`messaging::router`]) - who receives `move` and
//!   `chat` fan-outs
//!
//! The transport around the core lives in [`server`] and [`connection`]: an
//! axum router, one reader and one writer task per WebSocket, and a
//! connection manager that queues outbound frames on bounded queues without
//! blocking.
//!
//! ### Message Flow
//!
//! 1. A client connects; it receives `init` with its id, then one
//!    `player_join` per player already present. Everyone else receives a
//!    `player_join` for the newcomer.
//! 2. `{"type":"move","x":..,"y":..,"z":..}` updates the sender's position
//!    and is relayed as `player_move` to every other client.
//! 3. `{"type":"chat","message":..}` is relayed as `chat` with an `HH:MM:SS`
//!    timestamp to every client, the sender included.
//! 4. On disconnect every remaining client receives `player_leave`.
//!
//! Unrecognized payloads and messages from unknown connections are dropped.
//!
//! ## Thread Safety
//!
//! The registry sits behind one `tokio::sync::Mutex`. Each event holds it for
//! the whole read-modify-write and fan-out sequence; sends only enqueue, so
//! the lock is never held across network I/O.
//!
//! ## Health Check
//!
//! `GET /health` on the same port answers `{"status":"ok","players":<n>}`.
//! Every other path is upgraded to a relay WebSocket.

pub use config::ServerConfig;
pub use connection::{ClientSender, ConnectionId, ConnectionManager};
pub use error::ServerError;
pub use messaging::{ClientMessage, ServerMessage};
pub use registry::{Player, PlayerId, PlayerRegistry, Position};
pub use server::RelayServer;
pub use session::Relay;
pub use utils::{create_server, create_server_with_config};

pub mod config;
pub mod connection;
pub mod error;
pub mod messaging;
pub mod registry;
pub mod server;
pub mod session;
pub mod utils;

#[cfg(test)]
mod test_support;
