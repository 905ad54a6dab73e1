//! The per-frame analysis task.
//!
//! Not a free-running loop: the task is a single deadline that is re-armed
//! each time it fires. Canceling clears the deadline, after which `poll`
//! never fires again until `start` is called.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct FrameTask {
    interval: Duration,
    due: Option<Instant>,
}

impl FrameTask {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            due: None,
        }
    }

    /// Arm the task; the first tick is due immediately.
    pub fn start(&mut self, now: Instant) {
        self.due = Some(now);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// Fire if armed and due, re-arming one interval from `now`.
    ///
    /// Late polls fire once rather than catching up on missed frames.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// How long until the next tick, if armed.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }
}
