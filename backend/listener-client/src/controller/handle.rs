//! Controller actor and its public handle.
//!
//! All transitions go through one task so that host commands, session events and
//! the reconnect timer never run concurrently:
//!
//! - Host commands arrive on an mpsc channel (checked first)
//! - Session events arrive on a second channel, tagged by session
//! - The reconnect timer is polled from the controller's single slot

use crate::config::{ConnectionConfig, ListenerConfig, ReconnectConfig};
use crate::controller::Controller;
use crate::controller::status::StatusSender;
use crate::error::controller::ControllerError;
use crate::protocol::Command;
use crate::session::{Connector, SessionEventReceiver, WsConnector};

use common::ErrorLocation;

use std::panic::Location;

use log::{info, warn};
use tokio::spawn as TokioSpawn;
use tokio::sync::{mpsc, oneshot};

/// Requests accepted by the controller actor.
#[derive(Debug)]
pub enum ControlCommand {
    /// Start, or restart with a fresh retry budget
    Start,

    /// Replace config and reconnect immediately
    ConfigUpdated(ConnectionConfig),

    /// Stop; acknowledged once nothing is left scheduled
    Shutdown(oneshot::Sender<()>),

    /// Best-effort outbound command
    Send(Command),
}

/// Cloneable handle to a running controller actor.
///
/// The actor stops (closing its session) once every handle is dropped.
#[derive(Clone)]
pub struct ControllerHandle {
    command_tx: mpsc::UnboundedSender<ControlCommand>,
}

impl ControllerHandle {
    /// # Errors
    ///
    /// Returns [`ControllerError::ActorStopped`] if the actor has exited.
    pub fn start(&self) -> Result<(), ControllerError> {
        self.dispatch(ControlCommand::Start)
    }

    /// # Errors
    ///
    /// Returns [`ControllerError::ActorStopped`] if the actor has exited.
    pub fn config_updated(&self, config: ConnectionConfig) -> Result<(), ControllerError> {
        self.dispatch(ControlCommand::ConfigUpdated(config))
    }

    /// Shut down and wait for the actor to confirm.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::ActorStopped`] if the actor has exited.
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.dispatch(ControlCommand::Shutdown(ack_tx))?;

        ack_rx.await.map_err(|e| ControllerError::ActorStopped {
            message: format!("Controller stopped before acknowledging shutdown: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Fire-and-forget command. Logs a warning if the actor has exited.
    pub fn send_command(&self, command: Command) {
        if let Err(e) = self.dispatch(ControlCommand::Send(command)) {
            warn!("{e}");
        }
    }

    #[track_caller]
    fn dispatch(&self, command: ControlCommand) -> Result<(), ControllerError> {
        self.command_tx
            .send(command)
            .map_err(|e| ControllerError::ActorStopped {
                message: format!("Controller actor is not running: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Spawn a controller using the WebSocket transport.
///
/// Nothing connects until [`ControllerHandle::start`] is called.
pub fn spawn_controller(config: ListenerConfig, status: StatusSender) -> ControllerHandle {
    spawn_controller_with(WsConnector, config.connection, config.reconnect, status)
}

/// Spawn a controller over an arbitrary transport.
pub fn spawn_controller_with<C: Connector>(
    connector: C,
    connection: ConnectionConfig,
    reconnect: ReconnectConfig,
    status: StatusSender,
) -> ControllerHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let controller = Controller::new(connector, connection, reconnect, event_tx, status);
    TokioSpawn(controller_actor(controller, command_rx, event_rx));

    ControllerHandle { command_tx }
}

async fn controller_actor<C: Connector>(
    mut controller: Controller<C>,
    mut command_rx: mpsc::UnboundedReceiver<ControlCommand>,
    mut event_rx: SessionEventReceiver,
) {
    info!("Listener controller started");

    loop {
        tokio::select! {
            biased;

            command = command_rx.recv() => match command {
                Some(ControlCommand::Start) => controller.start(),
                Some(ControlCommand::ConfigUpdated(config)) => controller.config_updated(config),
                Some(ControlCommand::Shutdown(ack)) => {
                    controller.shutdown();
                    // Caller may have stopped waiting
                    let _ = ack.send(());
                }
                Some(ControlCommand::Send(command)) => controller.send_command(&command),
                None => break,
            },
            Some(envelope) = event_rx.recv() => controller.handle_session_event(envelope),
            attempt = controller.reconnect_fired() => controller.reconnect_due(attempt),
        }
    }

    controller.shutdown();
    info!("Listener controller stopped");
}
