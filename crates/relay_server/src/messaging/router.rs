//! Broadcast routing for inbound client messages.
//!
//! Decides which connections receive which outbound message:
//!
//! * `move` updates the sender's position and reaches every *other*
//!   connection; the sender already knows where it is.
//! * `chat` reaches *every* connection including the sender, so all clients
//!   display the line with the same server timestamp.
//!
//! Messages from a connection with no registry entry (arriving before open or
//! after close) are ignored.

use crate::connection::{ClientSender, ConnectionId};
use crate::error::ServerError;
use crate::messaging::{codec, ClientMessage, ServerMessage};
use crate::registry::Position;
use crate::session::Relay;
use tracing::{debug, info};

impl<S: ClientSender> Relay<S> {
    /// Entry point for raw text received on `connection`.
    ///
    /// Unrecognized payloads are dropped without a response.
    pub async fn message_received(
        &self,
        connection: ConnectionId,
        raw: &str,
    ) -> Result<(), ServerError> {
        match codec::decode(raw) {
            Some(message) => self.route(connection, message).await,
            None => Ok(()),
        }
    }

    /// Routes an already decoded message from `connection`.
    pub async fn route(
        &self,
        connection: ConnectionId,
        message: ClientMessage,
    ) -> Result<(), ServerError> {
        match message {
            ClientMessage::Move { x, y, z } => {
                self.relay_move(connection, Position::new(x, y, z)).await
            }
            ClientMessage::Chat { message } => self.relay_chat(connection, message).await,
        }
    }

    async fn relay_move(
        &self,
        connection: ConnectionId,
        position: Position,
    ) -> Result<(), ServerError> {
        let mut registry = self.registry().await;
        let Some(player) = registry.update_position(connection, position) else {
            debug!("Move from unregistered connection {} ignored", connection);
            return Ok(());
        };

        let text = codec::encode(&ServerMessage::player_move(&player))?;
        self.fan_out(
            registry.handles().filter(|handle| *handle != connection),
            &text,
        );

        debug!(
            "Player {} moved to ({}, {}, {})",
            player.id, position.x, position.y, position.z
        );
        Ok(())
    }

    async fn relay_chat(&self, connection: ConnectionId, message: String) -> Result<(), ServerError> {
        let registry = self.registry().await;
        let Some(sender_id) = registry.get(connection).map(|player| player.id) else {
            debug!("Chat from unregistered connection {} ignored", connection);
            return Ok(());
        };

        info!("[CHAT] {}: {}", sender_id, message);

        let text = codec::encode(&ServerMessage::Chat {
            id: sender_id,
            message,
            timestamp: codec::chat_timestamp(),
        })?;
        self.fan_out(registry.handles(), &text);
        Ok(())
    }
}
