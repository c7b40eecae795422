//! Reconnect timing constants.

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_INCREMENT_MS: u64 = 500;
const DEFAULT_PER_RUN_CEILING_MS: u64 = 10_000;
const DEFAULT_ABSOLUTE_CEILING_MS: u64 = 15_000;

/// Linear step and the two ceilings applied to every reconnect delay.
///
/// The per-run ceiling is applied first and the absolute ceiling second; with
/// the defaults the second clamp never binds, but both are always applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_increment_ms")]
    pub increment_ms: u64,
    #[serde(default = "default_per_run_ceiling_ms")]
    pub per_run_ceiling_ms: u64,
    #[serde(default = "default_absolute_ceiling_ms")]
    pub absolute_ceiling_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            increment_ms: DEFAULT_INCREMENT_MS,
            per_run_ceiling_ms: DEFAULT_PER_RUN_CEILING_MS,
            absolute_ceiling_ms: DEFAULT_ABSOLUTE_CEILING_MS,
        }
    }
}

fn default_increment_ms() -> u64 {
    DEFAULT_INCREMENT_MS
}
fn default_per_run_ceiling_ms() -> u64 {
    DEFAULT_PER_RUN_CEILING_MS
}
fn default_absolute_ceiling_ms() -> u64 {
    DEFAULT_ABSOLUTE_CEILING_MS
}

impl ReconnectConfig {
    pub fn increment(&self) -> Duration {
        Duration::from_millis(self.increment_ms)
    }

    pub fn per_run_ceiling(&self) -> Duration {
        Duration::from_millis(self.per_run_ceiling_ms)
    }

    pub fn absolute_ceiling(&self) -> Duration {
        Duration::from_millis(self.absolute_ceiling_ms)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("increment_ms", self.increment_ms),
            ("per_run_ceiling_ms", self.per_run_ceiling_ms),
            ("absolute_ceiling_ms", self.absolute_ceiling_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("reconnect.{name} must be greater than 0"),
                });
            }
        }

        Ok(())
    }
}
