//! Transport selection, resolved once at startup.

use crate::config::{Config, ConfigError};

/// A configured notification provider.
///
/// Built from [`Config`] before the server starts; escalation dispatch only
/// matches on the variant, never re-inspects the raw sender string.
#[derive(Debug, Clone)]
pub enum Transport {
    Slack {
        webhook_url: String,
        channel: String,
        username: String,
        icon_emoji: String,
    },
    PagerDuty {
        integration_key: String,
    },
    Teams {
        webhook_url: String,
    },
    Telegram {
        bot_token: String,
        chat_id: i64,
    },
    /// Plain JSON webhook with a configurable method and endpoint.
    Generic {
        method: reqwest::Method,
        endpoint: String,
    },
}

impl Transport {
    /// Map the configured sender to a transport. Unknown values fall back to
    /// Slack; an explicitly selected generic transport with an unparseable
    /// HTTP method is a fatal configuration error.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let transport = match config.sender.as_str() {
            "slack" => Self::slack(config),
            "pagerduty" => Transport::PagerDuty {
                integration_key: config.pagerduty_integration_key.clone(),
            },
            "teams" => Transport::Teams {
                webhook_url: config.teams_webhook.clone(),
            },
            "telegram" => Transport::Telegram {
                bot_token: config.telegram_token.clone(),
                chat_id: config.telegram_chat_id,
            },
            "generic" | "webhook" => Transport::Generic {
                method: config.http_method.parse().map_err(|_| {
                    ConfigError::Invalid(format!(
                        "http_method {:?} is not a valid HTTP method",
                        config.http_method
                    ))
                })?,
                endpoint: config.http_endpoint.clone(),
            },
            other => {
                tracing::warn!(sender = %other, "Unknown sender, defaulting to slack");
                Self::slack(config)
            }
        };
        Ok(transport)
    }

    fn slack(config: &Config) -> Self {
        Transport::Slack {
            webhook_url: config.slack_webhook.clone(),
            channel: config.slack_channel.clone(),
            username: config.slack_username.clone(),
            icon_emoji: config.slack_icon.clone(),
        }
    }

    /// Stable label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Transport::Slack { .. } => "slack",
            Transport::PagerDuty { .. } => "pagerduty",
            Transport::Teams { .. } => "teams",
            Transport::Telegram { .. } => "telegram",
            Transport::Generic { .. } => "generic",
        }
    }
}
