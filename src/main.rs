use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use uptime_warden::cli::{Cli, Commands};
use uptime_warden::config::AppConfig;
use uptime_warden::runtime;

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    match cli.command() {
        Commands::Run => {
            init_logging(&config.logging);
            info!("Starting uptime-warden: {}", config.summary());

            tokio::select! {
                result = runtime::run(config) => {
                    if let Err(e) = result {
                        error!("Watchdog stopped: {}", e);
                        return Err(e.into());
                    }
                }
                _ = shutdown_signal() => {
                    info!("Shutdown signal received, exiting");
                }
            }
        }
        Commands::Probe => {
            init_logging_simple();
            let report = runtime::probe_once(&config).await?;
            match &report.detail {
                Some(detail) => println!("{} {} ({})", config.check_url, report.status, detail),
                None => println!("{} {}", config.check_url, report.status),
            }
            if !report.is_up() {
                std::process::exit(1);
            }
        }
        Commands::CheckConfig => {
            println!("Configuration OK: {}", config.summary());
            let unlisted = config.unlisted_privileged_users();
            if !unlisted.is_empty() {
                println!(
                    "Warning: privileged users not in monitor_users: {:?}",
                    unlisted
                );
            }
        }
    }

    Ok(())
}
