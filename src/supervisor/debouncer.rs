//! Outage Debouncer
//!
//! Runs the double-confirmation protocol on every scheduled tick: a failed
//! probe is re-checked after a delay, and only two consecutive failures
//! confirm an outage. Alerts are edge-triggered, one per outage episode.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{Notifier, OutageState};
use crate::messages;
use crate::probe::Prober;

/// What a single tick observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// First probe passed
    Healthy,
    /// First probe failed, confirming probe passed
    Transient,
    /// Both probes failed; `alerted` is true when this tick sent the alert
    ConfirmedDown { alerted: bool },
}

pub struct OutageDebouncer {
    prober: Arc<dyn Prober>,
    notifier: Arc<Notifier>,
    state: Arc<OutageState>,
    second_check_delay: Duration,
}

impl OutageDebouncer {
    pub fn new(
        prober: Arc<dyn Prober>,
        notifier: Arc<Notifier>,
        state: Arc<OutageState>,
        second_check_delay: Duration,
    ) -> Self {
        Self {
            prober,
            notifier,
            state,
            second_check_delay,
        }
    }

    /// Run one probe / confirm / alert cycle
    pub async fn tick(&self) -> TickOutcome {
        let first = self.prober.probe().await;
        if first.is_up() {
            if self.state.reset_healthy().await {
                info!("Service is reachable again");
            }
            return TickOutcome::Healthy;
        }

        info!(
            "Service check failed ({}). Retrying in {}s...",
            first.detail.as_deref().unwrap_or("no detail"),
            self.second_check_delay.as_secs()
        );
        tokio::time::sleep(self.second_check_delay).await;

        let second = self.prober.probe().await;
        if second.is_up() {
            info!("Second check passed, treating failure as transient");
            self.state.reset_healthy().await;
            return TickOutcome::Transient;
        }

        warn!(
            "Service is confirmed down on second check ({})",
            second.detail.as_deref().unwrap_or("no detail")
        );
        if self.state.set_confirmed_down().await {
            self.notifier.broadcast(messages::OUTAGE_ALERT).await;
            TickOutcome::ConfirmedDown { alerted: true }
        } else {
            debug!("Outage already announced, suppressing duplicate alert");
            TickOutcome::ConfirmedDown { alerted: false }
        }
    }

    /// Tick forever on a fixed interval. The first tick fires one interval
    /// after start; a tick that overruns delays the next one.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Outage debouncer started, checking every {}s", interval.as_secs());

        loop {
            ticker.tick().await;
            let outcome = self.tick().await;
            debug!(?outcome, "Health check tick complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeStatus::{Down, Up};
    use crate::supervisor::test_support::{RecordingSink, ScriptedProber};

    fn debouncer(
        script: &[crate::probe::ProbeStatus],
    ) -> (OutageDebouncer, Arc<RecordingSink>, Arc<OutageState>, Arc<ScriptedProber>) {
        let sink = Arc::new(RecordingSink::new());
        let prober = Arc::new(ScriptedProber::new(script));
        let state = Arc::new(OutageState::new());
        let notifier = Arc::new(Notifier::new(sink.clone(), vec![10, 20]));
        let debouncer = OutageDebouncer::new(
            prober.clone(),
            notifier,
            state.clone(),
            Duration::from_secs(30),
        );
        (debouncer, sink, state, prober)
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_tick_probes_once() {
        let (debouncer, sink, state, prober) = debouncer(&[Up]);

        assert_eq!(debouncer.tick().await, TickOutcome::Healthy);
        assert_eq!(prober.calls(), 1);
        assert!(!state.is_down().await);
        assert!(sink.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_silent() {
        let (debouncer, sink, state, prober) = debouncer(&[Down, Up]);

        assert_eq!(debouncer.tick().await, TickOutcome::Transient);
        assert_eq!(prober.calls(), 2);
        assert!(!state.is_down().await);
        assert!(sink.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_probe_waits_for_delay() {
        let (debouncer, _sink, _state, _prober) = debouncer(&[Down, Down]);

        let started = Instant::now();
        debouncer.tick().await;
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_outage_alerts_all_recipients_once() {
        let (debouncer, sink, state, _prober) = debouncer(&[Down, Down, Down, Down]);

        assert_eq!(
            debouncer.tick().await,
            TickOutcome::ConfirmedDown { alerted: true }
        );
        assert!(state.is_down().await);
        assert_eq!(sink.chats(), vec![10, 20]);
        assert_eq!(sink.count_text(messages::OUTAGE_ALERT), 2);

        assert_eq!(
            debouncer.tick().await,
            TickOutcome::ConfirmedDown { alerted: false }
        );
        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_via_tick_is_silent() {
        let (debouncer, sink, state, _prober) = debouncer(&[Down, Down, Up]);

        debouncer.tick().await;
        assert_eq!(debouncer.tick().await, TickOutcome::Healthy);
        assert!(!state.is_down().await);
        // only the first outage alert, no recovery message
        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_clears_confirmed_outage() {
        let (debouncer, _sink, state, _prober) = debouncer(&[Down, Down, Down, Up]);

        debouncer.tick().await;
        assert!(state.is_down().await);
        assert_eq!(debouncer.tick().await, TickOutcome::Transient);
        assert!(!state.is_down().await);
    }
}
