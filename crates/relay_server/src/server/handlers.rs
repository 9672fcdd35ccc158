//! WebSocket connection handling.
//!
//! Turns one upgraded WebSocket into the relay's three lifecycle events:
//! `connection_opened` once the upgrade completes, `message_received` for
//! every text frame, and `connection_closed` when the socket goes away.

use super::RelayState;
use crate::connection::{ConnectionId, ConnectionManager};
use crate::session::Relay;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Upgrades any request path to a relay WebSocket, unless the server is full.
pub(crate) async fn websocket_handler(
    State(state): State<RelayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    let players = state.relay.player_count().await;
    if players >= state.config.max_connections {
        warn!("Rejecting {}: server is full ({} players)", addr, players);
        return (StatusCode::SERVICE_UNAVAILABLE, "Server is full").into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, addr, state.relay))
}

/// What an inbound frame means to the relay.
#[derive(Debug, PartialEq)]
enum Inbound<'a> {
    Text(&'a str),
    Close,
    Ignored,
}

/// Binary frames carrying valid UTF-8 are treated like text frames.
fn classify(message: &Message) -> Inbound<'_> {
    match message {
        Message::Text(text) => Inbound::Text(text.as_str()),
        Message::Binary(data) => match std::str::from_utf8(data) {
            Ok(text) => Inbound::Text(text),
            Err(_) => Inbound::Ignored,
        },
        Message::Close(_) => Inbound::Close,
        // Pongs are answered by the WebSocket layer itself.
        Message::Ping(_) | Message::Pong(_) => Inbound::Ignored,
    }
}

/// Serves a single client from upgrade to close.
async fn handle_socket(socket: WebSocket, addr: SocketAddr, relay: Arc<Relay<ConnectionManager>>) {
    let (ws_sink, mut ws_receiver) = socket.split();
    let (connection_id, outbound) = relay.sender().add_connection(addr);
    let writer = tokio::spawn(write_outbound(connection_id, ws_sink, outbound));

    info!("Connection {} established from {}", connection_id, addr);
    if let Err(e) = relay.connection_opened(connection_id).await {
        error!("Failed to open session for connection {}: {}", connection_id, e);
    }

    while let Some(frame) = ws_receiver.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                debug!("WebSocket error for connection {}: {}", connection_id, e);
                break;
            }
        };

        match classify(&message) {
            Inbound::Text(text) => {
                if let Err(e) = relay.message_received(connection_id, text).await {
                    error!("Error handling message from {}: {}", connection_id, e);
                }
            }
            Inbound::Close => {
                debug!("Connection {} requested close", connection_id);
                break;
            }
            Inbound::Ignored => {}
        }
    }

    if let Err(e) = relay.connection_closed(connection_id).await {
        error!("Failed to close session for connection {}: {}", connection_id, e);
    }
    let removed = relay.sender().remove_connection(connection_id);
    let _ = writer.await;

    match removed {
        Some(connection) => info!(
            "Connection {} from {} closed after {:.1}s",
            connection_id,
            connection.remote_addr,
            connection.age().as_secs_f64()
        ),
        None => info!("Connection {} from {} closed", connection_id, addr),
    }
}

/// Drains a connection's outbound queue onto its socket until the queue is
/// closed, a Close frame has been written, or the socket fails.
async fn write_outbound(
    connection_id: ConnectionId,
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<Message>,
) {
    while let Some(message) = outbound.recv().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(e) = sink.send(message).await {
            debug!("Write to connection {} failed: {}", connection_id, e);
            return;
        }
        if closing {
            return;
        }
    }
    let _ = sink.close().await;
}
