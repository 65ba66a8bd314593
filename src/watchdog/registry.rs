//! Concurrency-safe registry of keyed deadline timers.
//!
//! Each watchdog key owns at most one live timer. Arming a key cancels any
//! previous timer for it and schedules a fresh one; a timer that reaches its
//! deadline without being superseded escalates exactly once through the
//! registry's [`EscalationSink`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::context::{CheckinContext, EscalationEvent};
use crate::metrics;

/// Receiver for escalation events produced by fired timers.
///
/// Implementations must not block: the production sink spawns the network
/// dispatch on its own task, test sinks record the event.
pub trait EscalationSink: Send + Sync + 'static {
    fn escalate(&self, event: EscalationEvent);
}

struct TimerSlot {
    /// Identifies the timer instance occupying this slot. A fired task only
    /// commits if its generation still matches, so a superseded timer that
    /// woke up concurrently with its replacement never escalates.
    generation: u64,
    handle: tokio::task::JoinHandle<()>,
}

/// Mapping from watchdog key to its live deadline timer.
pub struct TimerRegistry {
    timers: DashMap<String, TimerSlot>,
    generation: AtomicU64,
    sink: Arc<dyn EscalationSink>,
}

impl TimerRegistry {
    pub fn new(sink: Arc<dyn EscalationSink>) -> Self {
        Self {
            timers: DashMap::new(),
            generation: AtomicU64::new(0),
            sink,
        }
    }

    /// Cancel any live timer for `key` and schedule a new one that escalates
    /// with `context` after `deadline`, unless superseded by a later arm.
    ///
    /// Safe under arbitrary concurrent calls. A zero deadline fires
    /// immediately.
    pub fn arm(self: &Arc<Self>, key: &str, deadline: Duration, context: CheckinContext) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        // The entry guard is held across the whole stop-then-arm sequence: a
        // concurrently firing task for this key blocks on the shard lock in
        // `fire` until the replacement is committed, and then fails its
        // generation check. No I/O happens under the lock.
        let entry = self.timers.entry(key.to_string());

        let registry = Arc::clone(self);
        let task_key = key.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            registry.fire(&task_key, generation, context);
        });

        let superseded = match entry {
            Entry::Occupied(mut occupied) => {
                Some(occupied.insert(TimerSlot { generation, handle }))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(TimerSlot { generation, handle });
                None
            }
        };

        if let Some(old) = superseded {
            old.handle.abort();
        }
        metrics::ACTIVE_TIMERS.set(self.timers.len() as f64);
    }

    /// Number of keys with a live (armed, not yet fired or stopped) timer.
    pub fn count(&self) -> usize {
        self.timers.len()
    }

    /// Cancel all live timers. No escalation fires afterward; a dispatch
    /// already handed to the sink is not interrupted.
    pub fn stop_all(&self) {
        let keys: Vec<String> = self.timers.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, slot)) = self.timers.remove(&key) {
                slot.handle.abort();
            }
        }
        metrics::ACTIVE_TIMERS.set(self.timers.len() as f64);
    }

    /// Commit point for a timer that reached its deadline. Removing the slot
    /// under a matching generation is what makes the escalation happen; once
    /// removed, a late check-in arms a fresh timer instead of canceling this
    /// dispatch.
    fn fire(&self, key: &str, generation: u64, context: CheckinContext) {
        let removed = self
            .timers
            .remove_if(key, |_, slot| slot.generation == generation);
        if removed.is_none() {
            // Superseded between wakeup and commit.
            return;
        }

        metrics::ACTIVE_TIMERS.set(self.timers.len() as f64);
        tracing::warn!(key = %key, alert_name = %context.alert_name, "Missed check-in deadline, escalating");
        self.sink.escalate(EscalationEvent::new(key.to_string(), context));
    }
}
