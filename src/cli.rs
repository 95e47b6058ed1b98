use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "uptime-warden")]
#[command(version)]
#[command(about = "Service watchdog bot with Telegram alerts and remote recovery", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path (JSON, TOML or YAML by extension)
    #[arg(short, long, env = "WARDEN_CONFIG", default_value = "config.json")]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Run the watchdog and the Telegram bot (default)
    Run,
    /// Probe the configured URL once; exits 1 when the service is down
    Probe,
    /// Load and validate the configuration, then print a summary
    CheckConfig,
}

impl Cli {
    /// Subcommand to execute, `run` when none was given
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}
