//! Remediation Workflow
//!
//! Operator-triggered recovery: launch the configured recovery action, give
//! the service a fixed grace period to come back, then re-probe and report.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

use super::{Notifier, OutageState};
use crate::config::{AppConfig, ChatId};
use crate::error::RecoveryError;
use crate::messages;
use crate::probe::Prober;

/// A recovery procedure the watchdog can launch on the host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecoveryAction: Send + Sync {
    /// Run the procedure to completion. Errors mean it could not be launched
    /// or reported failure.
    async fn attempt_recovery(&self) -> Result<(), RecoveryError>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

/// Runs `<interpreter> <script>` with no arguments and discards its output
#[derive(Debug, Clone)]
pub struct ShellRecoveryAction {
    interpreter: String,
    script: PathBuf,
}

impl ShellRecoveryAction {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.script_interpreter.clone(), config.script_path.clone())
    }
}

#[async_trait]
impl RecoveryAction for ShellRecoveryAction {
    async fn attempt_recovery(&self) -> Result<(), RecoveryError> {
        if tokio::fs::metadata(&self.script).await.is_err() {
            return Err(RecoveryError::NotFound(self.script.display().to_string()));
        }

        let status = Command::new(&self.interpreter)
            .arg(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(RecoveryError::ExitStatus(status))
        }
    }

    fn describe(&self) -> String {
        format!("{} {}", self.interpreter, self.script.display())
    }
}

/// How a remediation request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationOutcome {
    /// The action could not be launched; nothing else was done
    LaunchFailed(String),
    /// Service answered after the grace period
    Recovered,
    /// Service still down after the grace period
    StillDown,
}

pub struct RemediationWorkflow {
    action: Arc<dyn RecoveryAction>,
    prober: Arc<dyn Prober>,
    notifier: Arc<Notifier>,
    state: Arc<OutageState>,
    grace_period: Duration,
}

impl RemediationWorkflow {
    pub fn new(
        action: Arc<dyn RecoveryAction>,
        prober: Arc<dyn Prober>,
        notifier: Arc<Notifier>,
        state: Arc<OutageState>,
        grace_period: Duration,
    ) -> Self {
        Self {
            action,
            prober,
            notifier,
            state,
            grace_period,
        }
    }

    /// Launch, wait, re-probe, report. `requester` gets the acknowledgement
    /// and any failure; success goes to every recipient.
    pub async fn run(&self, requester: ChatId) -> RemediationOutcome {
        self.notifier
            .send_to(requester, messages::RECOVERY_STARTED)
            .await;

        info!("Launching recovery action: {}", self.action.describe());
        if let Err(e) = self.action.attempt_recovery().await {
            warn!("Recovery action failed: {}", e);
            self.notifier
                .send_to(requester, messages::launch_failed(&e))
                .await;
            return RemediationOutcome::LaunchFailed(e.to_string());
        }

        info!(
            "Recovery action finished, waiting {}s before re-check",
            self.grace_period.as_secs()
        );
        tokio::time::sleep(self.grace_period).await;

        let report = self.prober.probe().await;
        if report.is_up() {
            info!("Service recovered after remediation");
            self.notifier.broadcast(messages::RECOVERY_SUCCEEDED).await;
            self.state.reset_healthy().await;
            RemediationOutcome::Recovered
        } else {
            warn!(
                "Service still down after remediation ({})",
                report.detail.as_deref().unwrap_or("no detail")
            );
            self.notifier.send_to(requester, messages::STILL_DOWN).await;
            RemediationOutcome::StillDown
        }
    }
}
