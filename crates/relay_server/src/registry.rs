//! Player registry.
//!
//! The registry is the source of truth mapping each open connection to the
//! player it was assigned. An entry exists exactly while its connection is
//! open: it is created when the open event is processed and removed when the
//! close event is processed. The registry does no locking of its own; the
//! relay core wraps it in a single mutex so multi-step sequences stay atomic.

use crate::connection::ConnectionId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Server-generated player identity.
///
/// Backed by a random v4 UUID, which is practically collision-free. Serialized
/// as the hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-reported 3D position. Taken verbatim, never validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Registry entry for one open connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub position: Position,
}

impl Player {
    fn spawn() -> Self {
        Self {
            id: PlayerId::new(),
            position: Position::default(),
        }
    }
}

/// Mapping from connection handle to player state.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<ConnectionId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a player with a fresh id at the origin and stores it under
    /// `connection`. Handles are never reused by the transport, so an
    /// existing entry is not expected here and is simply replaced.
    pub fn insert(&mut self, connection: ConnectionId) -> Player {
        let player = Player::spawn();
        self.players.insert(connection, player);
        player
    }

    pub fn get(&self, connection: ConnectionId) -> Option<&Player> {
        self.players.get(&connection)
    }

    /// Overwrites the stored position and returns the updated player.
    /// Absent handles (stale or early messages) are a no-op returning `None`.
    pub fn update_position(
        &mut self,
        connection: ConnectionId,
        position: Position,
    ) -> Option<Player> {
        let player = self.players.get_mut(&connection)?;
        player.position = position;
        Some(*player)
    }

    pub fn remove(&mut self, connection: ConnectionId) -> Option<Player> {
        self.players.remove(&connection)
    }

    /// Handles of every registered connection, in no particular order.
    pub fn handles(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.players.keys().copied()
    }

    /// Every `(handle, player)` pair, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (ConnectionId, &Player)> + '_ {
        self.players.iter().map(|(handle, player)| (*handle, player))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
