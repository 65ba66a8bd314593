//! Outbound escalation delivery.

use std::time::Duration;

use serde::Serialize;

use super::payload;
use super::transport::Transport;
use crate::watchdog::EscalationEvent;

const PAGERDUTY_EVENTS_URL: &str = "https://events.pagerduty.com/v2/enqueue";

/// Sends one best-effort notification per escalation over the configured
/// transport. Every call is bounded by the client timeout; there is no retry.
pub struct Notifier {
    client: reqwest::Client,
    transport: Transport,
    environment: String,
}

impl Notifier {
    pub fn new(transport: Transport, environment: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            transport,
            environment,
        }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Build the provider payload for `event` and perform a single outbound
    /// send.
    pub async fn dispatch(&self, event: &EscalationEvent) -> Result<(), NotifyError> {
        match &self.transport {
            Transport::Slack {
                webhook_url,
                channel,
                username,
                icon_emoji,
            } => {
                let message = payload::slack(event, channel, username, icon_emoji);
                self.send_json(reqwest::Method::POST, webhook_url, &message)
                    .await
            }
            Transport::Teams { webhook_url } => {
                let card = payload::teams(event, &self.environment);
                self.send_json(reqwest::Method::POST, webhook_url, &card)
                    .await
            }
            Transport::Generic { method, endpoint } => {
                let body = payload::generic(event, &self.environment);
                self.send_json(method.clone(), endpoint, &body).await
            }
            Transport::PagerDuty { integration_key } => {
                let pd_event = payload::pagerduty(event, integration_key, &self.environment);
                self.send_json(reqwest::Method::POST, PAGERDUTY_EVENTS_URL, &pd_event)
                    .await
            }
            Transport::Telegram { bot_token, chat_id } => {
                let message = payload::telegram(event, *chat_id);
                let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
                self.send_json(reqwest::Method::POST, &url, &message).await
            }
        }
    }

    /// Shared webhook path: send JSON, read the response body, log it.
    async fn send_json<T: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &T,
    ) -> Result<(), NotifyError> {
        let response = self
            .client
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(NotifyError::from_reqwest)?;

        let status = response.status();
        let response_body = response.text().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read notification response body");
            String::new()
        });

        if !status.is_success() {
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body: response_body,
            });
        }

        tracing::info!(
            transport = self.transport.name(),
            status = status.as_u16(),
            body = %response_body,
            "Escalation notification delivered"
        );
        Ok(())
    }
}

/// Delivery failures. Logged and dropped by the caller; never retried.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification request timed out")]
    Timeout,

    #[error("Notification request failed: {0}")]
    Request(reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Provider { status: u16, body: String },
}

impl NotifyError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            NotifyError::Timeout
        } else {
            NotifyError::Request(error)
        }
    }

    /// Outcome label for the escalation counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            NotifyError::Timeout => "timeout",
            NotifyError::Request(_) => "error",
            NotifyError::Provider { .. } => "rejected",
        }
    }
}
