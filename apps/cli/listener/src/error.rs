use common::ErrorLocation;

use thiserror::Error;

/// Errors surfaced by the listener binary.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Error from this App
    #[error("Listener Error: {message} {location}")]
    App {
        message: String,
        location: ErrorLocation,
    },

    /// Error from listener-client operations (config, controller, protocol)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}
