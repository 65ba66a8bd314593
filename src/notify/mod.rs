//! Escalation dispatch over pluggable notification transports.

pub mod notifier;
pub mod payload;
pub mod transport;

pub use notifier::{Notifier, NotifyError};
pub use transport::Transport;

use std::sync::Arc;

use crate::metrics;
use crate::watchdog::{EscalationEvent, EscalationSink};

/// Production [`EscalationSink`]: hands each fired event to the notifier on
/// its own task, so registry timing is never coupled to network I/O.
pub struct Escalator {
    notifier: Arc<Notifier>,
}

impl Escalator {
    pub fn new(notifier: Arc<Notifier>) -> Self {
        Self { notifier }
    }
}

impl EscalationSink for Escalator {
    fn escalate(&self, event: EscalationEvent) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let transport = notifier.transport_name();
            match notifier.dispatch(&event).await {
                Ok(()) => {
                    metrics::ESCALATIONS.with_label_values(&[transport, "ok"]).inc();
                }
                Err(e) => {
                    metrics::ESCALATIONS
                        .with_label_values(&[transport, e.outcome()])
                        .inc();
                    tracing::error!(
                        key = %event.key,
                        transport = transport,
                        error = %e,
                        "Failed to deliver escalation"
                    );
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchdog::CheckinContext;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_delivery_failure_is_counted_and_dropped() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n")
                    .await;
            }
        });

        let notifier = Arc::new(Notifier::new(
            Transport::Generic {
                method: reqwest::Method::POST,
                endpoint: format!("http://{addr}/hook"),
            },
            String::new(),
            Duration::from_secs(5),
        ));
        let escalator = Escalator::new(notifier);

        let rejected = metrics::ESCALATIONS.with_label_values(&["generic", "rejected"]);
        let before = rejected.get();

        escalator.escalate(EscalationEvent::new(
            "abc".to_string(),
            CheckinContext::default(),
        ));

        // dispatch runs on its own task; the failure must surface only as a
        // counter increment, never as a panic or an error to the caller
        for _ in 0..100 {
            if rejected.get() > before {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(rejected.get() > before);
    }
}
