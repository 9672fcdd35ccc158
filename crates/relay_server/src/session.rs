//! Session lifecycle handling.
//!
//! [`Relay`] is the core of the server. It owns the player registry behind a
//! single mutex and reacts to the three transport events: connection opened,
//! message received (see [`crate::messaging::router`]) and connection closed.
//! Every event is processed as one critical section covering the registry
//! mutation and the resulting fan-out, so peers never observe a registry
//! mid-update and every connection sees a player's join before any move or
//! leave for that player.

use crate::connection::{ClientSender, ConnectionId};
use crate::error::ServerError;
use crate::messaging::{codec, ServerMessage};
use crate::registry::{Player, PlayerRegistry};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Connection registry and broadcast engine.
pub struct Relay<S> {
    registry: Mutex<PlayerRegistry>,
    sender: S,
}

impl<S: ClientSender> Relay<S> {
    pub fn new(sender: S) -> Self {
        Self {
            registry: Mutex::new(PlayerRegistry::new()),
            sender,
        }
    }

    /// The transport this relay delivers through.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub async fn player_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    /// Handles a newly opened connection.
    ///
    /// Registers a player for `connection`, sends it `init` with its id, seeds
    /// it with a `player_join` for every other registered player, and announces
    /// the new player to everyone else.
    pub async fn connection_opened(&self, connection: ConnectionId) -> Result<Player, ServerError> {
        let mut registry = self.registry.lock().await;
        let player = registry.insert(connection);

        let init = codec::encode(&ServerMessage::Init { id: player.id })?;
        self.deliver(connection, &init);

        for (handle, other) in registry.entries() {
            if handle == connection {
                continue;
            }
            let join = codec::encode(&ServerMessage::player_join(other))?;
            self.deliver(connection, &join);
        }

        let announce = codec::encode(&ServerMessage::player_join(&player))?;
        let peers = self.fan_out(
            registry.handles().filter(|handle| *handle != connection),
            &announce,
        );

        info!(
            "👋 Player {} connected on connection {} ({} peer(s) notified)",
            player.id, connection, peers
        );
        Ok(player)
    }

    /// Handles a closed connection.
    ///
    /// Removes the player and broadcasts `player_leave` to every remaining
    /// connection. Closing a connection that has no entry is a no-op, which
    /// makes double closes harmless.
    pub async fn connection_closed(
        &self,
        connection: ConnectionId,
    ) -> Result<Option<Player>, ServerError> {
        let mut registry = self.registry.lock().await;
        let Some(player) = registry.remove(connection) else {
            debug!("Close for unregistered connection {} ignored", connection);
            return Ok(None);
        };

        let leave = codec::encode(&ServerMessage::PlayerLeave { id: player.id })?;
        self.fan_out(registry.handles(), &leave);

        info!("👋 Player {} disconnected", player.id);
        Ok(Some(player))
    }

    pub(crate) async fn registry(&self) -> tokio::sync::MutexGuard<'_, PlayerRegistry> {
        self.registry.lock().await
    }

    /// Sends one payload to one target. Failures are logged and absorbed.
    pub(crate) fn deliver(&self, connection: ConnectionId, text: &str) -> bool {
        match self.sender.send(connection, text) {
            Ok(()) => true,
            Err(e) => {
                debug!("Dropping payload for connection {}: {}", connection, e);
                false
            }
        }
    }

    /// Sends the same payload to every target independently and returns how
    /// many deliveries succeeded. A failed target never stops the rest.
    pub(crate) fn fan_out<I>(&self, targets: I, text: &str) -> usize
    where
        I: IntoIterator<Item = ConnectionId>,
    {
        targets
            .into_iter()
            .filter(|target| self.deliver(*target, text))
            .count()
    }
}
