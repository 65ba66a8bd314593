//! Keyed deadline-timer registry with reset-on-checkin semantics.
//!
//! A check-in arms (or re-arms) the timer for its key; a timer that reaches
//! its deadline escalates through an [`EscalationSink`]. This module has no
//! knowledge of notification transports.

pub mod context;
pub mod coordinator;
pub mod registry;

pub use context::{AlertPayload, CheckinContext, EscalationEvent};
pub use coordinator::{CheckinCoordinator, CheckinError};
pub use registry::{EscalationSink, TimerRegistry};
