//! Check-in handling: one accepted check-in becomes exactly one arm call.

use std::sync::Arc;
use std::time::Duration;

use super::context::{AlertPayload, CheckinContext};
use super::registry::TimerRegistry;
use crate::metrics;

/// Translates check-in signals into timer arms with the configured deadline.
pub struct CheckinCoordinator {
    registry: Arc<TimerRegistry>,
    deadline: Duration,
}

impl CheckinCoordinator {
    pub fn new(registry: Arc<TimerRegistry>, deadline: Duration) -> Self {
        Self { registry, deadline }
    }

    /// Arm or reset the timer for `key` from one check-in.
    ///
    /// A malformed key leaves the registry untouched: any prior timer for it
    /// keeps counting down.
    pub fn checkin(&self, key: &str, payload: &AlertPayload) -> Result<(), CheckinError> {
        if !valid_key(key) {
            metrics::CHECKINS_MALFORMED.inc();
            tracing::warn!(key = %key, "Rejected malformed check-in key");
            return Err(CheckinError::InvalidKey(key.to_string()));
        }

        metrics::CHECKINS_RECEIVED.inc();
        let context = CheckinContext::from_payload(payload);
        tracing::debug!(key = %key, alert_name = %context.alert_name, "Check-in received");
        self.registry.arm(key, self.deadline, context);
        Ok(())
    }

    pub fn registry(&self) -> &Arc<TimerRegistry> {
        &self.registry
    }
}

/// Keys come from a URL path segment; reject empty or oversized values and
/// anything outside a conservative identifier charset.
fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

#[derive(Debug, thiserror::Error)]
pub enum CheckinError {
    #[error("Invalid watchdog key: {0:?}")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchdog::context::EscalationEvent;
    use crate::watchdog::registry::EscalationSink;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<EscalationEvent>>,
    }

    impl EscalationSink for RecordingSink {
        fn escalate(&self, event: EscalationEvent) {
            self.events.lock().push(event);
        }
    }

    fn coordinator(deadline: Duration) -> (CheckinCoordinator, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let registry = Arc::new(TimerRegistry::new(sink.clone()));
        (CheckinCoordinator::new(registry, deadline), sink)
    }

    #[test]
    fn test_valid_key() {
        assert!(valid_key("ca1lodo2hb0gp1kssj60"));
        assert!(valid_key("prod.cluster-1:watchdog"));
        assert!(!valid_key(""));
        assert!(!valid_key("has space"));
        assert!(!valid_key("path/traversal"));
        assert!(!valid_key(&"x".repeat(129)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkin_arms_timer() {
        let (coordinator, _sink) = coordinator(Duration::from_secs(60));

        coordinator.checkin("abc", &AlertPayload::default()).unwrap();
        assert_eq!(coordinator.registry().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_key_leaves_existing_timer_running() {
        let (coordinator, sink) = coordinator(Duration::from_secs(2));

        coordinator.checkin("abc", &AlertPayload::default()).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // a malformed key must not reset abc's countdown
        assert!(coordinator.checkin("", &AlertPayload::default()).is_err());
        assert_eq!(coordinator.registry().count(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.events.lock().len(), 1);
    }
}
