//! Process assembly
//!
//! Builds the component graph from a validated [`AppConfig`] and runs the
//! two task streams: the scheduled debouncer and the Telegram command
//! stream.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::adapters::{TelegramClient, UpdatePoller};
use crate::commands::CommandRouter;
use crate::config::AppConfig;
use crate::error::Result;
use crate::probe::{HttpProber, ProbeReport, Prober};
use crate::services::{HealthServer, HealthState};
use crate::supervisor::{
    MessageSink, Notifier, OutageDebouncer, OutageState, RemediationWorkflow, ShellRecoveryAction,
};

/// Pending invocations buffered between the poller and the router
const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Everything the two task streams share
pub struct Components {
    pub state: Arc<OutageState>,
    pub prober: Arc<dyn Prober>,
    pub notifier: Arc<Notifier>,
    pub debouncer: Arc<OutageDebouncer>,
    pub router: Arc<CommandRouter>,
}

impl Components {
    /// Wire the core against a message sink, probing over HTTP and
    /// recovering through the configured script
    pub fn build(config: &AppConfig, sink: Arc<dyn MessageSink>) -> Result<Self> {
        let prober: Arc<dyn Prober> = Arc::new(HttpProber::from_config(config)?);
        Ok(Self::with_prober(config, sink, prober))
    }

    pub fn with_prober(
        config: &AppConfig,
        sink: Arc<dyn MessageSink>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        let state = Arc::new(OutageState::new());
        let notifier = Arc::new(Notifier::new(sink, config.monitor_users.clone()));

        let debouncer = Arc::new(OutageDebouncer::new(
            prober.clone(),
            notifier.clone(),
            state.clone(),
            config.second_check_delay(),
        ));

        let remediation = Arc::new(RemediationWorkflow::new(
            Arc::new(ShellRecoveryAction::from_config(config)),
            prober.clone(),
            notifier.clone(),
            state.clone(),
            config.script_wait_time(),
        ));

        let router = Arc::new(CommandRouter::from_config(
            config,
            remediation,
            prober.clone(),
            state.clone(),
            notifier.clone(),
        ));

        Self {
            state,
            prober,
            notifier,
            debouncer,
            router,
        }
    }
}

/// Run the watchdog until the command stream ends
pub async fn run(config: AppConfig) -> Result<()> {
    let telegram = Arc::new(TelegramClient::from_config(&config)?);

    // a bad token is fatal before any task starts
    let me = telegram.get_me().await?;
    info!(
        "Authorized on Telegram as @{}",
        me.username.as_deref().unwrap_or(&me.first_name)
    );

    for user in config.unlisted_privileged_users() {
        warn!(
            "Privileged user {} is not in monitor_users and will not receive broadcasts",
            user
        );
    }

    let components = Components::build(&config, telegram.clone())?;
    info!("Monitoring {}", config.check_url);

    tokio::spawn(components.debouncer.clone().run(config.check_interval()));

    if let Some(addr) = config.health_addr {
        let server = HealthServer::new(
            Arc::new(HealthState::new(
                components.state.clone(),
                config.check_url.clone(),
            )),
            addr,
        );
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Health server stopped: {}", e);
            }
        });
    }

    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let poller = UpdatePoller::new(telegram, config.telegram.poll_timeout_seconds);
    tokio::spawn(poller.run(tx));

    components.router.serve(rx).await;
    Ok(())
}

/// Probe the configured URL once
pub async fn probe_once(config: &AppConfig) -> Result<ProbeReport> {
    let prober = HttpProber::from_config(config)?;
    Ok(prober.probe().await)
}
