//! JSON codec for the relay wire format.

use crate::error::ServerError;
use crate::messaging::{ClientMessage, ServerMessage};
use tracing::debug;

/// `strftime` pattern for chat timestamps.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Parses an inbound text payload.
///
/// The `type` discriminator picks the variant and the remaining fields are
/// checked against that variant's schema. Unknown types, missing or mistyped
/// fields and invalid JSON all yield `None`: unrecognized payloads are
/// dropped, never reported to the caller. Extra fields are ignored.
pub fn decode(raw: &str) -> Option<ClientMessage> {
    match serde_json::from_str(raw) {
        Ok(message) => Some(message),
        Err(e) => {
            debug!("Dropping unrecognized payload ({e}): {raw}");
            None
        }
    }
}

/// Serializes an outbound message.
pub fn encode(message: &ServerMessage) -> Result<String, ServerError> {
    Ok(serde_json::to_string(message)?)
}

/// Current local wall-clock time as `HH:MM:SS`.
pub fn chat_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
