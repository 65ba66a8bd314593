//! Vigil: Dead Man's Switch Watchdog
//!
//! Expects a periodic check-in for each monitored heartbeat key and, if one
//! fails to arrive before the configured deadline, fires an escalation
//! notification through a pluggable transport (Slack, PagerDuty, Teams,
//! Telegram, or a generic webhook). Guards an alerting pipeline's own
//! liveness: if the pipeline stops checking in, vigil pages a human.
//!
//! # Features
//!
//! - **Keyed Deadline Timers**: one cancelable timer per watchdog key with
//!   atomic reset-on-checkin semantics
//! - **Per-Arm Context Capture**: a firing escalation carries the check-in
//!   that failed to reset it, never a later unrelated one
//! - **Pluggable Transports**: selected once at startup from configuration
//! - **Best-Effort Dispatch**: bounded timeout, no retries, failures are
//!   observability-only
//! - **Prometheus Metrics**: check-ins received, live timer count, check-in
//!   latency, escalation outcomes
//!
//! All timer state is in-memory and lost on restart; every key must check in
//! again after a restart before its next deadline.

pub mod api;
pub mod config;
pub mod metrics;
pub mod notify;
pub mod watchdog;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use notify::{Notifier, NotifyError, Transport};
pub use watchdog::{CheckinCoordinator, EscalationEvent, TimerRegistry};
