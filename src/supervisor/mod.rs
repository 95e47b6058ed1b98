//! Supervisor Layer for Service Monitoring and Recovery
//!
//! This module provides the watchdog core:
//! - Outage state shared by the scheduled checks and remediation
//! - Debouncer for double-confirmed, edge-triggered outage alerts
//! - Remediation workflow for operator-triggered recovery
//! - Notifier for best-effort delivery to recipients

pub mod debouncer;
pub mod notifier;
pub mod outage;
pub mod remediation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use debouncer::{OutageDebouncer, TickOutcome};
pub use notifier::{Button, MessageSink, Notifier, OutgoingMessage};
pub use outage::OutageState;
pub use remediation::{
    RecoveryAction, RemediationOutcome, RemediationWorkflow, ShellRecoveryAction,
};
