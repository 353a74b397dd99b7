//! Restart-on-input timer handles.

use chrono::{DateTime, Duration, Utc};

/// A single pending deadline. Each trigger cancels the pending deadline and
/// schedules a new one `delay` later.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Schedules the task at `now + delay`, replacing any pending deadline.
    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` once when the deadline has passed, clearing it.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
