use thiserror::Error;

/// Main error type for the watchdog
#[derive(Error, Debug)]
pub enum WardenError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error ({method}): {description}")]
    TelegramApi { method: String, description: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for WardenError
pub type Result<T> = std::result::Result<T, WardenError>;

/// Failure to launch the configured recovery action
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("script not found: {0}")]
    NotFound(String),

    #[error("failed to start: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{0}")]
    ExitStatus(std::process::ExitStatus),
}
