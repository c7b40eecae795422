//! Listener configuration.
//!
//! A [`ListenerConfig`] is read once from a TOML file, then patched with
//! environment overrides. The controller only ever sees immutable
//! [`ConnectionConfig`] snapshots; an update replaces the snapshot wholesale.

pub mod env;
pub mod paths;
pub mod reconnect;

pub use reconnect::ReconnectConfig;

use crate::error::config::ConfigError;
use crate::{LISTENER_DEFAULT_HOST, LISTENER_DEFAULT_PORT, LISTENER_WS_PATH, LISTENER_WS_URL_PREFIX};

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;
use url::Url;

// ============================================
// CONFIG STRUCTS
// ============================================

/// Target server and shared secret for one connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub secret: RedactedSecret,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secret: RedactedSecret::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListenerConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_host() -> String {
    LISTENER_DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    LISTENER_DEFAULT_PORT
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16, secret: RedactedSecret) -> Self {
        Self {
            host: host.into(),
            port,
            secret,
        }
    }

    /// Validate host and port.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty or malformed host, or port 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "host cannot be empty".to_string(),
            });
        }

        if self
            .host
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'))
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid host: {}", self.host),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "Invalid port: 0 (must be 1-65535)".to_string(),
            });
        }

        Ok(())
    }

    /// Build the `ws://host:port/ws` endpoint for this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if validation fails or the
    /// resulting address does not parse.
    pub fn url(&self) -> Result<Url, ConfigError> {
        self.validate()?;

        // IPv6 literals need brackets in the authority
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        let raw = format!(
            "{LISTENER_WS_URL_PREFIX}{host}:{port}{LISTENER_WS_PATH}",
            port = self.port
        );

        Url::parse(&raw).map_err(|e| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Invalid address {raw}: {e}"),
        })
    }
}

impl ListenerConfig {
    /// Load config from a TOML file.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.to_path_buf(),
                source: e,
            }
        })?;

        let config: ListenerConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.connection.validate()?;
        self.reconnect.validate()
    }
}
