//! Challenge-response authentication.
//!
//! The server opens every session with `authChallenge { salt }`; the client answers
//! with `auth { password: md5(salt + secret) }` and the server replies with
//! `authResponse { status }`. [`interpret`] turns one inbound message into the
//! action the controller must take. It holds no state: the salt is used once and
//! dropped with the message.

pub mod hasher;

pub use hasher::compute_digest;

use crate::protocol::{Command, InboundMessage};

use common::RedactedSecret;

/// `authResponse.status` value meaning success. Anything else is a rejection reason.
pub const AUTHENTICATED_STATUS: &str = "authenticated";

#[derive(Debug, Clone, PartialEq)]
pub enum HandshakeOutcome {
    /// Send this reply right away.
    Respond(Command),
    /// Server accepted the secret.
    Authenticated,
    /// Server rejected the secret, with its literal status.
    Rejected(String),
    /// Not a handshake message.
    Ignored,
}

pub fn interpret(message: &InboundMessage, secret: &RedactedSecret) -> HandshakeOutcome {
    match message {
        InboundMessage::AuthChallenge { salt } => HandshakeOutcome::Respond(Command::Auth {
            password: compute_digest(salt, secret.expose()),
        }),
        InboundMessage::AuthResponse { status } if status == AUTHENTICATED_STATUS => {
            HandshakeOutcome::Authenticated
        }
        InboundMessage::AuthResponse { status } => HandshakeOutcome::Rejected(status.clone()),
        InboundMessage::Other => HandshakeOutcome::Ignored,
    }
}
