//! Provider-specific payload construction.
//!
//! Each builder takes the escalation event snapshot; none of them perform
//! I/O. Field sets follow what each provider's webhook/API expects.

use serde::Serialize;

use crate::watchdog::EscalationEvent;

/// Slack incoming-webhook message.
#[derive(Debug, Serialize)]
pub struct SlackMessage {
    pub text: String,
    pub username: String,
    pub channel: String,
    pub icon_emoji: String,
}

pub fn slack(event: &EscalationEvent, channel: &str, username: &str, icon_emoji: &str) -> SlackMessage {
    SlackMessage {
        text: format!(
            "Missed dead man's switch check-in for `{}` - {}",
            event.key, event.context.message
        ),
        username: username.to_string(),
        channel: channel.to_string(),
        icon_emoji: icon_emoji.to_string(),
    }
}

/// Teams MessageCard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsCard {
    pub summary: String,
    pub title: String,
    pub text: String,
    pub theme_color: String,
    pub sections: Vec<TeamsSection>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsSection {
    pub activity_title: String,
    pub facts: Vec<TeamsFact>,
}

#[derive(Debug, Serialize)]
pub struct TeamsFact {
    pub name: String,
    pub value: String,
}

pub fn teams(event: &EscalationEvent, environment: &str) -> TeamsCard {
    let fact = |name: &str, value: &str| TeamsFact {
        name: name.to_string(),
        value: value.to_string(),
    };
    TeamsCard {
        summary: "Watchdog deadline missed".to_string(),
        title: "Alerting pipeline watchdog expired".to_string(),
        text: format!("No check-in received for `{}` before its deadline", event.key),
        theme_color: "F74721".to_string(),
        sections: vec![TeamsSection {
            activity_title: "*** IMPORTANT ***".to_string(),
            facts: vec![
                fact("Alertname:", &event.context.alert_name),
                fact("Severity:", &event.context.severity),
                fact("Environment:", environment),
                fact("Message:", &event.context.message),
                fact(
                    "Action Required:",
                    "The alerting pipeline stopped checking in; verify Alertmanager is functional",
                ),
            ],
        }],
    }
}

/// PagerDuty Events API v2 trigger.
#[derive(Debug, Serialize)]
pub struct PagerDutyEvent {
    pub routing_key: String,
    pub event_action: &'static str,
    /// Equal to the alert name so repeated escalations for the same alert
    /// collapse into one open incident.
    pub dedup_key: String,
    pub client: &'static str,
    pub payload: PagerDutyPayload,
}

#[derive(Debug, Serialize)]
pub struct PagerDutyPayload {
    pub summary: String,
    pub source: String,
    pub severity: String,
    pub timestamp: String,
    pub group: String,
    pub class: String,
    pub custom_details: serde_json::Value,
}

pub fn pagerduty(event: &EscalationEvent, integration_key: &str, environment: &str) -> PagerDutyEvent {
    let severity = if event.context.severity.is_empty() {
        "critical".to_string()
    } else {
        event.context.severity.clone()
    };
    PagerDutyEvent {
        routing_key: integration_key.to_string(),
        event_action: "trigger",
        dedup_key: event.context.alert_name.clone(),
        client: "vigil dead man's switch",
        payload: PagerDutyPayload {
            summary: format!("Missed dead man's switch check-in for {}", event.key),
            source: "vigil".to_string(),
            severity,
            timestamp: event.fired_at.to_rfc3339(),
            group: event.context.job.clone(),
            class: event.context.alert_name.clone(),
            custom_details: serde_json::json!({
                "message": event.context.message,
                "environment": environment,
                "watchdog_key": event.key,
            }),
        },
    }
}

/// Telegram Bot API sendMessage.
#[derive(Debug, Serialize)]
pub struct TelegramMessage {
    pub chat_id: i64,
    pub text: String,
}

pub fn telegram(event: &EscalationEvent, chat_id: i64) -> TelegramMessage {
    TelegramMessage {
        chat_id,
        text: format!(
            "Missed dead man's switch check-in for {} - {}",
            event.key, event.context.message
        ),
    }
}

/// Body for the generic webhook transport: the full event snapshot.
pub fn generic(event: &EscalationEvent, environment: &str) -> serde_json::Value {
    serde_json::json!({
        "watchdog_key": event.key,
        "message": event.context.message,
        "severity": event.context.severity,
        "job": event.context.job,
        "alertname": event.context.alert_name,
        "environment": environment,
        "fired_at": event.fired_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchdog::CheckinContext;

    fn event(key: &str, alert_name: &str) -> EscalationEvent {
        EscalationEvent::new(
            key.to_string(),
            CheckinContext {
                message: "svc down".to_string(),
                severity: "critical".to_string(),
                job: "alertmanager".to_string(),
                alert_name: alert_name.to_string(),
            },
        )
    }

    #[test]
    fn test_slack_message_fields() {
        let message = slack(&event("abc", "Watchdog"), "#alerts", "vigil", ":rotating_light:");
        assert!(message.text.contains("abc"));
        assert!(message.text.contains("svc down"));

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["channel"], "#alerts");
        assert_eq!(json["icon_emoji"], ":rotating_light:");
    }

    #[test]
    fn test_pagerduty_dedup_key_is_stable_across_escalations() {
        let first = pagerduty(&event("abc", "Watchdog"), "pd-key", "prod");
        let second = pagerduty(&event("abc", "Watchdog"), "pd-key", "prod");

        assert_eq!(first.dedup_key, "Watchdog");
        assert_eq!(first.dedup_key, second.dedup_key);
        assert_eq!(first.event_action, "trigger");
        assert_eq!(first.payload.group, "alertmanager");
        assert_eq!(first.payload.class, "Watchdog");
    }

    #[test]
    fn test_pagerduty_severity_defaults_to_critical() {
        let mut e = event("abc", "Watchdog");
        e.context.severity = String::new();

        let pd = pagerduty(&e, "pd-key", "");
        assert_eq!(pd.payload.severity, "critical");
    }

    #[test]
    fn test_teams_card_carries_environment() {
        let card = teams(&event("abc", "Watchdog"), "prod");
        let facts = &card.sections[0].facts;
        assert!(facts.iter().any(|f| f.name == "Environment:" && f.value == "prod"));
        assert!(facts.iter().any(|f| f.value == "svc down"));
    }

    #[test]
    fn test_generic_payload_shape() {
        let body = generic(&event("abc", "Watchdog"), "prod");
        assert_eq!(body["watchdog_key"], "abc");
        assert_eq!(body["alertname"], "Watchdog");
        assert_eq!(body["environment"], "prod");
    }
}
