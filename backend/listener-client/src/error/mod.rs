pub mod config;
pub mod controller;
pub mod protocol;
pub mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Session(#[from] session::SessionError),

    #[error(transparent)]
    Protocol(#[from] protocol::ProtocolError),

    #[error(transparent)]
    Controller(#[from] controller::ControllerError),
}
