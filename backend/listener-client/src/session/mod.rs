//! Connection sessions.
//!
//! A session owns one socket and reports its life as an ordered stream of
//! [`SessionEvent`]s: `Ready` first, then any number of `Message`s, then exactly
//! one `Terminated`. All sessions report into one channel; each event is tagged
//! with the [`SessionId`] of the handle that produced it so the controller can
//! drop events from handles it has already let go of.

mod ws;

pub use ws::{WsConnector, WsSession};

use crate::error::session::SessionError;

use std::fmt;

use tokio::sync::mpsc;
use url::Url;

pub type SessionId = u64;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// Connect failure, protocol error, or I/O error.
    Error(String),
    /// Server closed the socket, with its close reason if any.
    RemoteClosed(Option<String>),
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Error(message) => write!(f, "Socket error: {message}"),
            TerminationReason::RemoteClosed(Some(reason)) if !reason.is_empty() => {
                write!(f, "Socket closed: {reason}")
            }
            TerminationReason::RemoteClosed(_) => write!(f, "Socket closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Ready,
    Message(String),
    /// A frame arrived that could not be read as text. The session stays open.
    DecodeFailed(String),
    Terminated(TerminationReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnvelope {
    pub session: SessionId,
    pub event: SessionEvent,
}

pub type SessionEventSender = mpsc::UnboundedSender<SessionEnvelope>;
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEnvelope>;

/// Opens sessions. Implemented by [`WsConnector`] and by test transports.
pub trait Connector: Send + 'static {
    type Session: Session;

    /// Start connecting to `url`. Must not block; progress is reported on `events`.
    fn open(&self, id: SessionId, url: &Url, events: SessionEventSender) -> Self::Session;
}

/// One owned session.
pub trait Session: Send {
    fn id(&self) -> SessionId;

    /// Queue `payload` for transmission.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] unless the socket is open.
    fn send(&self, payload: String) -> Result<(), SessionError>;

    /// Close the socket. Idempotent.
    fn close(&mut self);
}
