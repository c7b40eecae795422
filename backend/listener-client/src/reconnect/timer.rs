use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use log::debug;
use tokio::time::{Sleep, sleep};

struct PendingReconnect {
    attempt: u32,
    sleep: Pin<Box<Sleep>>,
}

/// Holds at most one scheduled reconnect.
///
/// Installing a timer cancels the previous one, so two reconnects can never be
/// in flight at once.
#[derive(Default)]
pub(crate) struct ReconnectSlot {
    pending: Option<PendingReconnect>,
}

impl ReconnectSlot {
    pub(crate) fn install(&mut self, attempt: u32, delay: Duration) {
        if let Some(previous) = self.pending.take() {
            debug!(
                "Replacing pending reconnect attempt {} with attempt {attempt}",
                previous.attempt
            );
        }

        self.pending = Some(PendingReconnect {
            attempt,
            sleep: Box::pin(sleep(delay)),
        });
    }

    /// Cancel the pending reconnect. Returns whether one was pending.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(previous) => {
                debug!("Cancelled pending reconnect attempt {}", previous.attempt);
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves with the attempt number once the pending timer elapses, clearing
    /// the slot. Never resolves while the slot is empty.
    ///
    /// Cancel safe: dropping the future leaves the timer in place.
    pub(crate) async fn fired(&mut self) -> u32 {
        let attempt = match self.pending.as_mut() {
            Some(reconnect) => {
                reconnect.sleep.as_mut().await;
                reconnect.attempt
            }
            None => return pending().await,
        };

        self.pending = None;
        attempt
    }
}
