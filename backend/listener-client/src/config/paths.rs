//! Config file location.

use crate::LISTENER_APP_NAME;

use std::env;
use std::path::PathBuf;

use log::{debug, info};

pub const CONFIG_PATH_ENV: &str = "LISTENER_CONFIG";
pub const CONFIG_FILE_NAME: &str = "listener.toml";

/// How the config path was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    EnvVar,
    PlatformDefault,
    WorkingDirectory,
}

#[derive(Debug, Clone)]
pub struct ConfigPath {
    pub path: PathBuf,
    pub source: PathSource,
}

/// Find the config file path.
///
/// # Platform Behavior
/// - **Linux**: `$XDG_CONFIG_HOME/bitfocus-listener/listener.toml` or `~/.config/...`
/// - **macOS**: `~/Library/Application Support/bitfocus-listener/listener.toml`
/// - **Windows**: `%APPDATA%/bitfocus-listener/listener.toml`
pub fn detect_config_path() -> ConfigPath {
    if let Ok(custom) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(custom);
        info!("Using {CONFIG_PATH_ENV} override: {:?}", path);
        return ConfigPath {
            path,
            source: PathSource::EnvVar,
        };
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join(LISTENER_APP_NAME).join(CONFIG_FILE_NAME);
        debug!("Platform config path: {:?}", path);
        return ConfigPath {
            path,
            source: PathSource::PlatformDefault,
        };
    }

    ConfigPath {
        path: PathBuf::from(CONFIG_FILE_NAME),
        source: PathSource::WorkingDirectory,
    }
}
