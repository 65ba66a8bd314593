//! Check-in payload and per-arm context types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a check-in request, shaped like an Alertmanager webhook payload.
///
/// Every field is optional on the wire; an empty `{}` body is a valid
/// check-in that simply carries no annotations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertPayload {
    pub receiver: String,
    pub status: String,
    pub group_labels: HashMap<String, String>,
    pub common_labels: HashMap<String, String>,
    pub common_annotations: HashMap<String, String>,
    #[serde(rename = "externalURL")]
    pub external_url: String,
}

/// Immutable snapshot of the alert data carried by one check-in.
///
/// Captured when a timer is armed and moved into the scheduled task, so a
/// firing escalation always reflects the check-in that failed to reset it,
/// never a later check-in for some other key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckinContext {
    /// `message` annotation from the check-in body.
    pub message: String,
    /// `severity` label.
    pub severity: String,
    /// `job` label.
    pub job: String,
    /// `alertname` label; doubles as the provider-side deduplication key.
    pub alert_name: String,
}

impl CheckinContext {
    pub fn from_payload(payload: &AlertPayload) -> Self {
        let label = |name: &str| payload.common_labels.get(name).cloned().unwrap_or_default();
        Self {
            message: payload
                .common_annotations
                .get("message")
                .cloned()
                .unwrap_or_default(),
            severity: label("severity"),
            job: label("job"),
            alert_name: label("alertname"),
        }
    }
}

/// Snapshot handed to the dispatcher when a deadline is missed.
#[derive(Debug, Clone)]
pub struct EscalationEvent {
    pub key: String,
    pub context: CheckinContext,
    pub fired_at: DateTime<Utc>,
}

impl EscalationEvent {
    pub fn new(key: String, context: CheckinContext) -> Self {
        Self {
            key,
            context,
            fired_at: Utc::now(),
        }
    }
}
