//! JSON wire messages exchanged with the listener server.
//!
//! Every message is a JSON object with a `type` discriminator. Only two inbound
//! types carry meaning for the client (`authChallenge`, `authResponse`); any other
//! type decodes to [`InboundMessage::Other`] and is ignored by the dispatcher.

pub mod command;

pub use command::Command;

use crate::error::protocol::ProtocolError;

use common::ErrorLocation;

use std::panic::Location;

use serde::Deserialize;

/// Server-to-client message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Server opens the handshake with a one-time salt.
    AuthChallenge { salt: String },

    /// Server verdict on the `auth` reply.
    AuthResponse { status: String },

    #[serde(other)]
    Other,
}

/// Decode one inbound text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if `raw` is not JSON, has no `type`, or a
/// known type is missing its fields.
pub fn decode(raw: &str) -> Result<InboundMessage, ProtocolError> {
    serde_json::from_str(raw).map_err(|e| ProtocolError::Decode {
        message: format!("Invalid JSON received: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
