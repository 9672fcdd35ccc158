//! Health check route.
//!
//! `GET /health` answers `{"status":"ok","players":<count>}` on the same port
//! as the WebSocket endpoint.

use super::RelayState;
use axum::{extract::State, Json};
use serde::Serialize;

pub const HEALTH_PATH: &str = "/health";

/// Body of a health response. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub players: usize,
}

impl HealthStatus {
    pub fn ok(players: usize) -> Self {
        Self { status: "ok", players }
    }
}

pub(crate) async fn health_handler(State(state): State<RelayState>) -> Json<HealthStatus> {
    Json(HealthStatus::ok(state.relay.player_count().await))
}
