//! Startup configuration.
//!
//! Loaded once at process start, either from a YAML file named by the
//! `VIGIL_CONFIG` environment variable or from individual `VIGIL_*`
//! environment variables. Immutable afterward and shared via `Arc`.

use serde::{Deserialize, Serialize};

/// Watchdog configuration, including per-transport credentials.
///
/// Only the credentials for the selected sender are used; the rest may stay
/// empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Deadline in seconds: a key escalates if no check-in arrives within
    /// this interval after its last one.
    pub interval: u64,
    /// Transport selection: slack, pagerduty, teams, telegram or generic.
    pub sender: String,
    /// Environment/cluster label included in escalation payloads.
    pub environment: String,
    /// Upper bound on one outbound notification call, in seconds.
    pub notify_timeout: u64,

    pub slack_webhook: String,
    pub slack_channel: String,
    pub slack_username: String,
    pub slack_icon: String,

    pub pagerduty_integration_key: String,

    pub teams_webhook: String,

    pub telegram_token: String,
    pub telegram_chat_id: i64,

    pub http_method: String,
    pub http_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            interval: 60,
            sender: "slack".to_string(),
            environment: String::new(),
            notify_timeout: 10,
            slack_webhook: String::new(),
            slack_channel: String::new(),
            slack_username: "vigil".to_string(),
            slack_icon: ":rotating_light:".to_string(),
            pagerduty_integration_key: String::new(),
            teams_webhook: String::new(),
            telegram_token: String::new(),
            telegram_chat_id: 0,
            http_method: "POST".to_string(),
            http_endpoint: String::new(),
        }
    }
}

impl Config {
    /// Load configuration: from the file named by `VIGIL_CONFIG` if set,
    /// otherwise from `VIGIL_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("VIGIL_CONFIG") {
            Ok(path) if !path.is_empty() => {
                tracing::info!(path = %path, "Reading configuration file");
                Self::from_file(&path)
            }
            _ => {
                tracing::info!("Using environment variables for configuration");
                Self::from_env()
            }
        }
    }

    /// Parse a YAML configuration file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_string(), e))?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from `VIGIL_*` environment variables. Unset
    /// variables keep their defaults; unparseable numeric values are fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(v) = std::env::var("VIGIL_HOST") {
            config.host = v;
        }
        config.port = env_parse("VIGIL_PORT", config.port)?;
        config.interval = env_parse("VIGIL_INTERVAL", config.interval)?;
        if let Ok(v) = std::env::var("VIGIL_SENDER") {
            config.sender = v;
        }
        if let Ok(v) = std::env::var("VIGIL_ENVIRONMENT") {
            config.environment = v;
        }
        config.notify_timeout = env_parse("VIGIL_NOTIFY_TIMEOUT", config.notify_timeout)?;

        if let Ok(v) = std::env::var("VIGIL_SLACK_WEBHOOK") {
            config.slack_webhook = v;
        }
        if let Ok(v) = std::env::var("VIGIL_SLACK_CHANNEL") {
            config.slack_channel = v;
        }
        if let Ok(v) = std::env::var("VIGIL_SLACK_USERNAME") {
            config.slack_username = v;
        }
        if let Ok(v) = std::env::var("VIGIL_SLACK_ICON") {
            config.slack_icon = v;
        }
        if let Ok(v) = std::env::var("VIGIL_PAGERDUTY_KEY") {
            config.pagerduty_integration_key = v;
        }
        if let Ok(v) = std::env::var("VIGIL_TEAMS_WEBHOOK") {
            config.teams_webhook = v;
        }
        if let Ok(v) = std::env::var("VIGIL_TELEGRAM_TOKEN") {
            config.telegram_token = v;
        }
        config.telegram_chat_id = env_parse("VIGIL_TELEGRAM_CHAT_ID", config.telegram_chat_id)?;
        if let Ok(v) = std::env::var("VIGIL_HTTP_METHOD") {
            config.http_method = v;
        }
        if let Ok(v) = std::env::var("VIGIL_HTTP_ENDPOINT") {
            config.http_endpoint = v;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::Invalid(
                "interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{name}={raw} is not a valid value"))),
        Err(_) => Ok(default),
    }
}

/// Fatal configuration errors; startup aborts before serving traffic.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("Cannot parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
