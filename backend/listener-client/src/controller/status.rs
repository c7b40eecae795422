use std::fmt;

use tokio::sync::mpsc;

/// Connection state reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Connecting, or connected and waiting for the handshake to finish.
    PendingAuth,
    /// Authenticated.
    Ok,
    /// Rejected credentials or unusable config. Needs an operator fix.
    BadConfig,
    TransportError,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::PendingAuth => "pending-auth",
            ConnectionStatus::Ok => "connected-ok",
            ConnectionStatus::BadConfig => "bad-config",
            ConnectionStatus::TransportError => "transport-error",
            ConnectionStatus::Disconnected => "disconnected",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: ConnectionStatus,
    pub detail: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: ConnectionStatus, detail: Option<String>) -> Self {
        Self { status, detail }
    }
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.status),
            None => write!(f, "{}", self.status),
        }
    }
}

pub type StatusSender = mpsc::UnboundedSender<StatusUpdate>;
pub type StatusReceiver = mpsc::UnboundedReceiver<StatusUpdate>;
