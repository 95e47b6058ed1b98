pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod messages;
pub mod probe;
pub mod runtime;
pub mod services;
pub mod supervisor;

pub use commands::{BotCommand, CommandInvocation, CommandRouter};
pub use config::AppConfig;
pub use error::{Result, WardenError};
pub use probe::{ProbeReport, ProbeStatus, Prober};
pub use supervisor::{
    MessageSink, Notifier, OutageDebouncer, OutageState, RecoveryAction, RemediationWorkflow,
};
