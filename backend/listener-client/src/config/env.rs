//! `.env` loading and environment overrides.

use crate::config::ListenerConfig;

use common::RedactedSecret;

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const HOST_ENV: &str = "LISTENER_HOST";
pub const PORT_ENV: &str = "LISTENER_PORT";
pub const SECRET_ENV: &str = "LISTENER_SECRET";

/// Result of attempting to load a .env file.
#[derive(Debug)]
pub struct EnvLoadResult {
    /// Path to loaded .env file, if found.
    pub path: Option<PathBuf>,
    /// Whether any .env file was loaded.
    pub loaded: bool,
}

/// Attempts to load .env from the current directory, then the executable's directory.
pub fn try_load_dotenv() -> EnvLoadResult {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return EnvLoadResult {
            path: Some(path),
            loaded: true,
        };
    }

    if let Ok(exe_path) = env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let env_path = exe_dir.join(".env");
        if env_path.exists() {
            match dotenvy::from_path(&env_path) {
                Ok(_) => {
                    info!("Loaded .env from: {:?}", env_path);
                    return EnvLoadResult {
                        path: Some(env_path),
                        loaded: true,
                    };
                }
                Err(e) => {
                    warn!("Failed to parse .env at {:?}: {}", env_path, e);
                }
            }
        }
    }

    debug!("No .env file found");
    EnvLoadResult {
        path: None,
        loaded: false,
    }
}

impl ListenerConfig {
    /// Apply `LISTENER_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup.
    ///
    /// An unparsable port is logged and left at its previous value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV) {
            debug!("Using {HOST_ENV} override: {host}");
            self.connection.host = host;
        }

        if let Some(port) = lookup(PORT_ENV) {
            match port.trim().parse::<u16>() {
                Ok(port) => {
                    debug!("Using {PORT_ENV} override: {port}");
                    self.connection.port = port;
                }
                Err(e) => warn!("Ignoring {PORT_ENV}={port}: {e}"),
            }
        }

        if let Some(secret) = lookup(SECRET_ENV) {
            let secret = RedactedSecret::new(secret);
            debug!("Using {SECRET_ENV} override ({} chars)", secret.len());
            self.connection.secret = secret;
        }
    }
}
