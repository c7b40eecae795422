//! Outbound command encoder.

use crate::error::protocol::ProtocolError;

use common::ErrorLocation;

use std::panic::Location;

use serde::Serialize;
use serde_json::{Map, Value};

const TYPE_FIELD: &str = "type";

/// Client-to-server command.
///
/// The handshake and subscription commands are typed; everything else a host
/// wants to send goes through [`Command::Passthrough`] unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Auth { password: String },
    SubscribeSysInfo,
    Subscribe { name: String },
    Unsubscribe { name: String },
    Passthrough(Map<String, Value>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum WireCommand<'a> {
    Auth { password: &'a str },
    SubscribeSysInfo,
    Subscribe { name: &'a str },
    Unsubscribe { name: &'a str },
}

impl Command {
    pub fn subscribe(name: impl Into<String>) -> Self {
        Command::Subscribe { name: name.into() }
    }

    pub fn unsubscribe(name: impl Into<String>) -> Self {
        Command::Unsubscribe { name: name.into() }
    }

    /// Wrap a host-supplied JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encode`] unless `value` is an object with a
    /// non-empty string `type`.
    pub fn passthrough(value: Value) -> Result<Self, ProtocolError> {
        let Value::Object(map) = value else {
            return Err(ProtocolError::Encode {
                message: "Command payload must be a JSON object".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        match map.get(TYPE_FIELD) {
            Some(Value::String(kind)) if !kind.is_empty() => Ok(Command::Passthrough(map)),
            _ => Err(ProtocolError::Encode {
                message: format!("Command payload needs a non-empty string '{TYPE_FIELD}'"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Wire `type` of this command (safe to log).
    pub fn kind(&self) -> &str {
        match self {
            Command::Auth { .. } => "auth",
            Command::SubscribeSysInfo => "subscribeSysInfo",
            Command::Subscribe { .. } => "subscribe",
            Command::Unsubscribe { .. } => "unsubscribe",
            Command::Passthrough(map) => map
                .get(TYPE_FIELD)
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    /// Serialize to the JSON text sent over the socket.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let result = match self {
            Command::Auth { password } => serde_json::to_string(&WireCommand::Auth { password }),
            Command::SubscribeSysInfo => serde_json::to_string(&WireCommand::SubscribeSysInfo),
            Command::Subscribe { name } => serde_json::to_string(&WireCommand::Subscribe { name }),
            Command::Unsubscribe { name } => {
                serde_json::to_string(&WireCommand::Unsubscribe { name })
            }
            Command::Passthrough(map) => serde_json::to_string(map),
        };

        result.map_err(|e| ProtocolError::Encode {
            message: format!("Failed to encode {} command: {e}", self.kind()),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
