//! Process-wide outage flag
//!
//! The only shared mutable state in the watchdog. Both the scheduled
//! debouncer and the remediation workflow write it, so every
//! read-modify-write happens under one lock.

use tokio::sync::Mutex;
use tracing::debug;

/// "Service considered down" flag, false at startup and never persisted
#[derive(Debug, Default)]
pub struct OutageState {
    down: Mutex<bool>,
}

impl OutageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an outage has been confirmed and announced
    pub async fn is_down(&self) -> bool {
        *self.down.lock().await
    }

    /// Enter ConfirmedDown. Returns true only for the call that made the
    /// transition, which is the one that must send the alert.
    pub async fn set_confirmed_down(&self) -> bool {
        let mut down = self.down.lock().await;
        let transitioned = !*down;
        *down = true;
        if transitioned {
            debug!("Outage state: healthy -> confirmed down");
        }
        transitioned
    }

    /// Return to Healthy. Returns true if the flag was previously set.
    pub async fn reset_healthy(&self) -> bool {
        let mut down = self.down.lock().await;
        let was_down = *down;
        *down = false;
        if was_down {
            debug!("Outage state: confirmed down -> healthy");
        }
        was_down
    }
}
