//! Config loading for the binary: TOML file, then `LISTENER_*` overrides.

use crate::error::ListenerError;

use common::ErrorLocation;
use listener_client::config::ListenerConfig;

use std::panic::Location;
use std::path::Path;

/// Load `path` (defaults if missing) and apply environment overrides.
///
/// Used both at startup and for `:reload`.
///
/// # Errors
///
/// Returns [`ListenerError::Core`] if the file is unreadable or invalid, or the
/// overrides leave the config invalid.
pub fn load_listener_config(path: &Path) -> Result<ListenerConfig, ListenerError> {
    load_with(path, ListenerConfig::apply_env_overrides)
}

/// As [`load_listener_config`], with the override step supplied by the caller.
pub fn load_with<F>(path: &Path, apply_overrides: F) -> Result<ListenerConfig, ListenerError>
where
    F: FnOnce(&mut ListenerConfig),
{
    let mut config = ListenerConfig::load(path).map_err(|e| ListenerError::Core {
        message: format!("Failed to load config: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    apply_overrides(&mut config);

    config.validate().map_err(|e| ListenerError::Core {
        message: format!("Invalid config after overrides: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(config)
}
