//! Surface focus tracking.
//!
//! Keeps the currently focused surface and a bounded history of recent
//! switches, the primary signal for paste attribution.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::surface::Surface;

/// Number of tab switches retained; the oldest is evicted first.
pub const TAB_HISTORY_CAPACITY: usize = 10;

/// One focus change between two surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSwitch {
    pub from: Surface,
    pub to: Surface,
    pub timestamp: DateTime<Utc>,
}

/// Focus state machine: `current` is `None` until the first focus change.
#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    current: Option<Surface>,
    last_switch: Option<DateTime<Utc>>,
    history: VecDeque<TabSwitch>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves focus to `surface`.
    ///
    /// A history record is pushed only when a surface was already focused.
    /// Returns the pushed record.
    pub fn focus(&mut self, surface: Surface, now: DateTime<Utc>) -> Option<TabSwitch> {
        let pushed = self.current.take().map(|from| {
            let switch = TabSwitch {
                from,
                to: surface.clone(),
                timestamp: now,
            };
            if self.history.len() == TAB_HISTORY_CAPACITY {
                self.history.pop_front();
            }
            self.history.push_back(switch.clone());
            switch
        });

        tracing::debug!(surface = %surface, "surface focused");
        self.current = Some(surface);
        self.last_switch = Some(now);
        pushed
    }

    pub const fn current(&self) -> Option<&Surface> {
        self.current.as_ref()
    }

    pub const fn last_switch_time(&self) -> Option<DateTime<Utc>> {
        self.last_switch
    }

    pub fn last_switch(&self) -> Option<&TabSwitch> {
        self.history.back()
    }

    /// Switch history, oldest first.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &TabSwitch> + ExactSizeIterator {
        self.history.iter()
    }

    /// The `n` most recent switches, newest first.
    pub fn recent(&self, n: usize) -> Vec<&TabSwitch> {
        self.history.iter().rev().take(n).collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
