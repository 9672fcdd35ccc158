//! Message type definitions for client-server communication.
//!
//! Every message on the wire is a JSON object whose `type` field selects the
//! variant. The sets below are closed: anything outside them is rejected by
//! the codec rather than half-parsed.

use crate::registry::{Player, PlayerId};
use serde::{Deserialize, Serialize};

/// A message sent from a client to the server.
///
/// # Example
///
/// ```json
/// { "type": "move", "x": 1.0, "y": 2.0, "z": 3.0 }
/// { "type": "chat", "message": "hello" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Position update from the sender
    Move { x: f64, y: f64, z: f64 },

    /// Free-text chat line from the sender
    Chat { message: String },
}

/// A message sent from the server to one or more clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once to a newly opened connection with its assigned id
    Init { id: PlayerId },

    /// Announces a player's presence and current position
    PlayerJoin { id: PlayerId, x: f64, y: f64, z: f64 },

    /// Announces a position update
    PlayerMove { id: PlayerId, x: f64, y: f64, z: f64 },

    /// Announces a player's departure
    PlayerLeave { id: PlayerId },

    /// Relays a chat line with a server-stamped `HH:MM:SS` time
    Chat {
        id: PlayerId,
        message: String,
        timestamp: String,
    },
}

impl ServerMessage {
    pub fn player_join(player: &Player) -> Self {
        let p = player.position;
        Self::PlayerJoin {
            id: player.id,
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }

    pub fn player_move(player: &Player) -> Self {
        let p = player.position;
        Self::PlayerMove {
            id: player.id,
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}
