use config::builder::DefaultState;
use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map, Source, Value,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, WardenError};

/// Telegram user identifier
pub type UserId = i64;

/// Telegram chat identifier (equal to the user id for private chats)
pub type ChatId = i64;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bot API token issued by BotFather
    pub bot_token: String,
    /// Endpoint probed on every tick
    pub check_url: String,
    /// Recipients of broadcast alerts
    pub monitor_users: Vec<UserId>,
    /// Users allowed to query status and trigger recovery
    #[serde(default)]
    pub privileged_users_sublist: Vec<UserId>,
    pub check_interval_seconds: u64,
    /// Delay before the confirming second probe
    pub second_check_delay_seconds: u64,
    /// Grace period between launching the recovery script and re-probing
    pub script_wait_time_seconds: u64,
    pub request_timeout_seconds: u64,
    /// Recovery script, run with `script_interpreter`
    pub script_path: String,
    pub script_interpreter: String,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Bind address for the health server (disabled when unset)
    #[serde(default)]
    pub health_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_url: String,
    /// Long-poll timeout passed to getUpdates
    pub poll_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rotated log files
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// camelCase keys written by earlier deployments and their current names
const LEGACY_KEYS: &[(&str, &str)] = &[
    ("telegramBotToken", "bot_token"),
    ("checkURL", "check_url"),
    ("monitorUsers", "monitor_users"),
    ("privilegedUsersSublist", "privileged_users_sublist"),
    ("checkIntervalSeconds", "check_interval_seconds"),
    ("secondCheckDelaySeconds", "second_check_delay_seconds"),
    ("scriptWaitTimeSeconds", "script_wait_time_seconds"),
    ("requestTimeoutSeconds", "request_timeout_seconds"),
    ("scriptPath", "script_path"),
];

/// File source that renames legacy top-level keys before they are merged,
/// so defaults and env overrides keep applying to the current names
#[derive(Debug, Clone)]
struct LegacyKeys<S>(S);

impl<S> Source for LegacyKeys<S>
where
    S: Source + Clone + Send + Sync + 'static,
{
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> std::result::Result<Map<String, Value>, ConfigError> {
        let mut table = self.0.collect()?;
        for (legacy, current) in LEGACY_KEYS {
            if let Some(value) = table.remove(*legacy) {
                // a current-style key in the same document wins
                if !table.contains_key(*current) {
                    table.insert(current.to_string(), value);
                }
            }
        }
        Ok(table)
    }
}

impl AppConfig {
    /// Load configuration from a file, then apply `WARDEN_*` environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(LegacyKeys(File::from(path.as_ref()).required(true)))
            // WARDEN_BOT_TOKEN, WARDEN_MONITOR_USERS=1,2, WARDEN_TELEGRAM__API_URL, ...
            .add_source(
                Environment::with_prefix("WARDEN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("monitor_users")
                    .with_list_parse_key("privileged_users_sublist"),
            );

        Self::finish(builder)
    }

    /// Parse configuration from an in-memory document (no environment overrides)
    pub fn parse(contents: &str, format: FileFormat) -> Result<Self> {
        let builder =
            Self::defaults()?.add_source(LegacyKeys(File::from_str(contents, format)));
        Self::finish(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            .set_default("check_interval_seconds", 60)?
            .set_default("second_check_delay_seconds", 30)?
            .set_default("script_wait_time_seconds", 60)?
            .set_default("request_timeout_seconds", 10)?
            .set_default("script_interpreter", "/bin/bash")?
            .set_default("telegram.api_url", "https://api.telegram.org")?
            .set_default("telegram.poll_timeout_seconds", 60)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?;
        Ok(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate().map_err(WardenError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.bot_token.trim().is_empty() {
            errors.push("bot_token must not be empty".to_string());
        }

        match url::Url::parse(&self.check_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(format!(
                "check_url must use http or https, got {}",
                parsed.scheme()
            )),
            Err(e) => errors.push(format!("check_url is not a valid URL: {e}")),
        }

        if self.monitor_users.is_empty() {
            errors.push("monitor_users must not be empty".to_string());
        }

        if self.check_interval_seconds == 0 {
            errors.push("check_interval_seconds must be positive".to_string());
        }

        if self.request_timeout_seconds == 0 {
            errors.push("request_timeout_seconds must be positive".to_string());
        }

        if self.script_path.trim().is_empty() {
            errors.push("script_path must not be empty".to_string());
        }

        if let Err(e) = url::Url::parse(&self.telegram.api_url) {
            errors.push(format!("telegram.api_url is not a valid URL: {e}"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Privileged users that will never receive broadcasts
    pub fn unlisted_privileged_users(&self) -> Vec<UserId> {
        self.privileged_users_sublist
            .iter()
            .copied()
            .filter(|id| !self.monitor_users.contains(id))
            .collect()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }

    pub fn second_check_delay(&self) -> Duration {
        Duration::from_secs(self.second_check_delay_seconds)
    }

    pub fn script_wait_time(&self) -> Duration {
        Duration::from_secs(self.script_wait_time_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// One-line summary without secrets
    pub fn summary(&self) -> String {
        format!(
            "url={} recipients={} privileged={} interval={}s second_check={}s script_wait={}s timeout={}s script={} {}",
            self.check_url,
            self.monitor_users.len(),
            self.privileged_users_sublist.len(),
            self.check_interval_seconds,
            self.second_check_delay_seconds,
            self.script_wait_time_seconds,
            self.request_timeout_seconds,
            self.script_interpreter,
            self.script_path,
        )
    }
}
