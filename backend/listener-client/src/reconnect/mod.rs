//! Reconnect delay policy and the single pending reconnect timer.
//!
//! Delays grow linearly (`attempt * increment`) and are clamped twice: first by
//! the per-run ceiling, then by the absolute ceiling.

mod timer;

pub(crate) use timer::ReconnectSlot;

use crate::config::ReconnectConfig;

use std::time::Duration;

use backoff::backoff::Backoff;

/// Delay before reconnect attempt `attempt` (1-based).
pub fn delay_for_attempt(config: &ReconnectConfig, attempt: u32) -> Duration {
    let stepped = config.increment().saturating_mul(attempt);
    let per_run = stepped.min(config.per_run_ceiling());
    per_run.min(config.absolute_ceiling())
}

/// Linear backoff state for one failure run.
///
/// `next_backoff` never returns `None`: reconnects are retried for as long as
/// the controller lives.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    config: ReconnectConfig,
    attempts: u32,
    current_delay: Duration,
}

impl ReconnectBackoff {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
            current_delay: config.increment(),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay handed out by the last `next_backoff`, or the base delay after a reset.
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn config(&self) -> &ReconnectConfig {
        &self.config
    }
}

impl Backoff for ReconnectBackoff {
    fn reset(&mut self) {
        self.attempts = 0;
        self.current_delay = self.config.increment();
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempts = self.attempts.saturating_add(1);
        self.current_delay = delay_for_attempt(&self.config, self.attempts);
        Some(self.current_delay)
    }
}
