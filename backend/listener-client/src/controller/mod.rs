//! Lifecycle controller.
//!
//! [`Controller`] owns the current config snapshot, the single live session, the
//! backoff state and the single pending reconnect timer. It is a plain state
//! machine driven by `&mut self` calls; [`spawn_controller`] wraps it in an actor
//! task so that commands, session events and the timer are handled one at a time.
//!
//! # Invariants
//!
//! - At most one live session. [`Controller::install_session`] closes any previous
//!   one before taking ownership of the new one.
//! - At most one pending reconnect. Every transition that opens a session, or
//!   tears one down on purpose, cancels the timer first.
//! - Events from any session other than the live one are dropped, so nothing a
//!   closed handle still had in flight is observable.

mod handle;
mod status;

pub use handle::{ControlCommand, ControllerHandle, spawn_controller, spawn_controller_with};
pub use status::{ConnectionStatus, StatusReceiver, StatusSender, StatusUpdate};

use crate::auth::{self, HandshakeOutcome};
use crate::config::{ConnectionConfig, ReconnectConfig};
use crate::protocol::{self, Command};
use crate::reconnect::{ReconnectBackoff, ReconnectSlot};
use crate::session::{
    Connector, Session, SessionEnvelope, SessionEvent, SessionEventSender, SessionId,
    TerminationReason,
};

use std::sync::Arc;

use backoff::backoff::Backoff;
use log::{debug, error, info, trace, warn};

pub struct Controller<C: Connector> {
    connector: C,
    config: Arc<ConnectionConfig>,
    backoff: ReconnectBackoff,
    session: Option<C::Session>,
    reconnect: ReconnectSlot,
    next_session_id: SessionId,
    events: SessionEventSender,
    status: StatusSender,
}

impl<C: Connector> Controller<C> {
    pub fn new(
        connector: C,
        config: ConnectionConfig,
        reconnect: ReconnectConfig,
        events: SessionEventSender,
        status: StatusSender,
    ) -> Self {
        Self {
            connector,
            config: Arc::new(config),
            backoff: ReconnectBackoff::new(reconnect),
            session: None,
            reconnect: ReconnectSlot::default(),
            next_session_id: 1,
            events,
            status,
        }
    }

    // ============================================
    // EXTERNAL TRANSITIONS
    // ============================================

    /// Start, or restart, with the current config. Resets the retry budget.
    pub fn start(&mut self) {
        info!("Starting listener connection");
        self.reconnect.cancel();
        self.backoff.reset();
        self.close_session();
        self.notify(ConnectionStatus::PendingAuth, None);
        self.connect();
    }

    /// Replace the config and reconnect right away.
    pub fn config_updated(&mut self, config: ConnectionConfig) {
        info!(
            "Config updated: {}:{} (secret {} chars)",
            config.host,
            config.port,
            config.secret.len()
        );
        self.reconnect.cancel();
        self.backoff.reset();
        self.config = Arc::new(config);
        self.close_session();
        self.notify(ConnectionStatus::PendingAuth, None);
        self.connect();
    }

    /// Cancel any pending reconnect and close the live session.
    ///
    /// Nothing is scheduled after this returns until the next `start` or
    /// `config_updated`.
    pub fn shutdown(&mut self) {
        debug!("Shutting down listener connection");
        self.reconnect.cancel();
        if self.session.is_some() {
            self.close_session();
            self.notify(ConnectionStatus::Disconnected, Some("Shut down".to_string()));
        }
    }

    /// Best-effort send on the live session. Failures are logged and the
    /// command is dropped.
    pub fn send_command(&mut self, command: &Command) {
        let Some(session) = self.session.as_ref() else {
            warn!("Socket not connected, dropping {} command", command.kind());
            return;
        };

        let payload = match command.encode() {
            Ok(payload) => payload,
            Err(e) => {
                error!("{e}");
                return;
            }
        };

        if let Err(e) = session.send(payload) {
            warn!("Dropping {} command: {e}", command.kind());
        }
    }

    // ============================================
    // INTERNAL TRANSITIONS
    // ============================================

    pub fn handle_session_event(&mut self, envelope: SessionEnvelope) {
        let live = self.session.as_ref().map(Session::id);
        if live != Some(envelope.session) {
            trace!(
                "Dropping {:?} from stale session {}",
                envelope.event, envelope.session
            );
            return;
        }

        match envelope.event {
            SessionEvent::Ready => self.on_ready(),
            SessionEvent::Message(raw) => self.on_message(&raw),
            SessionEvent::DecodeFailed(reason) => error!("Invalid message received: {reason}"),
            SessionEvent::Terminated(reason) => self.on_terminated(reason),
        }
    }

    /// Pending reconnect timer elapsed.
    pub fn reconnect_due(&mut self, attempt: u32) {
        debug!("Attempting to reconnect (attempt {attempt})");
        self.connect();
    }

    pub(crate) async fn reconnect_fired(&mut self) -> u32 {
        self.reconnect.fired().await
    }

    fn on_ready(&mut self) {
        debug!("Socket connected");
        self.backoff.reset();
        self.notify(
            ConnectionStatus::PendingAuth,
            Some("Awaiting authentication".to_string()),
        );
    }

    fn on_message(&mut self, raw: &str) {
        let message = match protocol::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                error!("{e}");
                return;
            }
        };

        let config = Arc::clone(&self.config);
        match auth::interpret(&message, &config.secret) {
            HandshakeOutcome::Respond(reply) => self.send_command(&reply),
            HandshakeOutcome::Authenticated => {
                info!("Authentication successful");
                self.notify(ConnectionStatus::Ok, None);
                self.send_command(&Command::SubscribeSysInfo);
            }
            HandshakeOutcome::Rejected(status) => {
                error!("Authentication failed: {status}");
                self.notify(
                    ConnectionStatus::BadConfig,
                    Some(format!("Authentication failed: {status}")),
                );
            }
            HandshakeOutcome::Ignored => debug!("Received message: {raw}"),
        }
    }

    fn on_terminated(&mut self, reason: TerminationReason) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }

        match &reason {
            TerminationReason::Error(_) => {
                error!("{reason}");
                self.notify(ConnectionStatus::TransportError, Some(reason.to_string()));
            }
            TerminationReason::RemoteClosed(_) => {
                debug!("{reason}");
                self.notify(ConnectionStatus::Disconnected, Some(reason.to_string()));
            }
        }

        self.schedule_reconnect();
    }

    fn connect(&mut self) {
        self.reconnect.cancel();

        let config = Arc::clone(&self.config);
        let url = match config.url() {
            Ok(url) => url,
            Err(e) => {
                error!("Not connecting: {e}");
                self.close_session();
                self.notify(ConnectionStatus::BadConfig, Some(e.to_string()));
                return;
            }
        };

        let id = self.next_session_id;
        self.next_session_id += 1;

        debug!("Connecting to {url}");
        let session = self.connector.open(id, &url, self.events.clone());
        self.install_session(session);
    }

    fn schedule_reconnect(&mut self) {
        let Some(delay) = self.backoff.next_backoff() else {
            warn!("Reconnect budget exhausted, not reconnecting");
            return;
        };

        let attempt = self.backoff.attempts();
        debug!(
            "Scheduling reconnect attempt {attempt} in {}ms",
            delay.as_millis()
        );
        self.reconnect.install(attempt, delay);
    }

    /// Take ownership of `session`, closing whatever was live before.
    fn install_session(&mut self, session: C::Session) {
        if let Some(mut previous) = self.session.take() {
            debug!(
                "Session {} superseded by session {}",
                previous.id(),
                session.id()
            );
            previous.close();
        }
        self.session = Some(session);
    }

    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }

    fn notify(&self, status: ConnectionStatus, detail: Option<String>) {
        // Host may have stopped listening; status is advisory
        let _ = self.status.send(StatusUpdate::new(status, detail));
    }

    // ============================================
    // INSPECTION
    // ============================================

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn live_session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(Session::id)
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.reconnect.is_pending()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.backoff.attempts()
    }
}

impl<C: Connector> Drop for Controller<C> {
    fn drop(&mut self) {
        self.reconnect.cancel();
        self.close_session();
    }
}
