//! Process metrics exposed on `/metrics`.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};

/// Total check-in signals accepted.
pub static CHECKINS_RECEIVED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "vigil_checkins_received_total",
        "Number of check-in signals that armed or reset a timer"
    )
    .expect("register vigil_checkins_received_total")
});

/// Check-ins rejected before touching the registry.
pub static CHECKINS_MALFORMED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "vigil_checkins_malformed_total",
        "Number of check-in signals rejected as malformed"
    )
    .expect("register vigil_checkins_malformed_total")
});

/// Keys with a live (armed, not yet fired or stopped) timer.
pub static ACTIVE_TIMERS: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "vigil_active_timers",
        "Number of watchdog keys with a live deadline timer"
    )
    .expect("register vigil_active_timers")
});

/// Escalation dispatch attempts by transport and outcome.
pub static ESCALATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vigil_escalations_total",
        "Escalation notifications attempted, by transport and outcome",
        &["transport", "outcome"]
    )
    .expect("register vigil_escalations_total")
});

/// Latency of handling one check-in request.
pub static CHECKIN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "vigil_checkin_duration_seconds",
        "Time spent handling a check-in request",
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("register vigil_checkin_duration_seconds")
});

/// Render all registered metrics in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buf) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_registered_metrics() {
        CHECKINS_RECEIVED.inc();
        ACTIVE_TIMERS.set(3.0);

        let out = render();
        assert!(out.contains("vigil_checkins_received_total"));
        assert!(out.contains("vigil_active_timers"));
    }
}
