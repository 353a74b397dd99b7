//! Entries for the append-only UI action log.
//!
//! The action log is a looser audit trail than the activity store: it covers
//! UI actions that never become activities (saves, URL bar loads) and is
//! owned by the shell, not the engine.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::activity::ellipsize;

/// Maximum characters of `content` kept in a log entry.
pub const ACTION_CONTENT_CAP: usize = 200;

/// One UI action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time in the local zone, for humans reading the raw log.
    pub local_time: String,
    /// The part of the UI that produced the action.
    pub source: String,
    pub action: String,
    pub content: String,
    /// Action-specific extra fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionEntry {
    /// Builds an entry; `content` is shortened to [`ACTION_CONTENT_CAP`].
    pub fn new(
        source: impl Into<String>,
        action: impl Into<String>,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            local_time: timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            source: source.into(),
            action: action.into(),
            content: ellipsize(content, ACTION_CONTENT_CAP),
            extra: Map::new(),
        }
    }

    /// Adds an extra field.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}
