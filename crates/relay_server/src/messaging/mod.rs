//! Wire messages, the JSON codec and broadcast routing.

pub mod codec;
pub mod router;
pub mod types;

pub use codec::{decode, encode};
pub use types::{ClientMessage, ServerMessage};
