//! Ordered in-memory activity log.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::Activity;

/// Activities in the order they were observed.
///
/// Grows without bound until bulk-cleared; individual records are never
/// removed or mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    activities: Vec<Activity>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an activity and returns a copy of it.
    pub fn push(&mut self, activity: Activity) -> Activity {
        self.activities.push(activity.clone());
        activity
    }

    /// Activities with `timestamp >= now - window`, in insertion order.
    pub fn recent_since(&self, window: Duration, now: DateTime<Utc>) -> Vec<&Activity> {
        let cutoff = now - window;
        self.activities
            .iter()
            .filter(|activity| activity.timestamp >= cutoff)
            .collect()
    }

    pub fn all(&self) -> &[Activity] {
        &self.activities
    }

    /// The last `n` activities, oldest first.
    pub fn tail(&self, n: usize) -> &[Activity] {
        let start = self.activities.len().saturating_sub(n);
        &self.activities[start..]
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn clear(&mut self) {
        self.activities.clear();
    }
}
