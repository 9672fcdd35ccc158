//! Shared helpers for unit tests.

use crate::connection::{ClientSender, ConnectionId};
use crate::error::ServerError;
use crate::messaging::ServerMessage;
use std::collections::HashSet;
use std::sync::Mutex;

/// Records every delivered payload; selected handles can be made to fail.
#[derive(Default)]
pub(crate) struct RecordingSender {
    sent: Mutex<Vec<(ConnectionId, String)>>,
    failing: Mutex<HashSet<ConnectionId>>,
}

impl RecordingSender {
    pub(crate) fn fail_for(&self, connection: ConnectionId) {
        self.failing.lock().unwrap().insert(connection);
    }

    /// Everything recorded so far, decoded, in delivery order.
    pub(crate) fn all(&self) -> Vec<(ConnectionId, ServerMessage)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(connection, text)| {
                let message = serde_json::from_str(text).expect("recorded payload is valid JSON");
                (*connection, message)
            })
            .collect()
    }

    /// Messages delivered to one connection, in delivery order.
    pub(crate) fn received_by(&self, connection: ConnectionId) -> Vec<ServerMessage> {
        self.all()
            .into_iter()
            .filter(|(target, _)| *target == connection)
            .map(|(_, message)| message)
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl ClientSender for RecordingSender {
    fn send(&self, connection: ConnectionId, text: &str) -> Result<(), ServerError> {
        if self.failing.lock().unwrap().contains(&connection) {
            return Err(ServerError::send(connection, "simulated failure"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((connection, text.to_owned()));
        Ok(())
    }
}

pub(crate) fn is_hh_mm_ss(stamp: &str) -> bool {
    let parts: Vec<&str> = stamp.split(':').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_digit()))
}
