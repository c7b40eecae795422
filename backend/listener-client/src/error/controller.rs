use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ControllerError {
    #[error("Actor Stopped Error: {message} {location}")]
    ActorStopped {
        message: String,
        location: ErrorLocation,
    },
}
