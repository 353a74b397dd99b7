//! Attribution of written text to the research activity behind it.
//!
//! Two cases are covered:
//! - **Paragraphs**: every activity inside the look-back window at the moment
//!   the paragraph is finalized is a candidate source, in chronological order.
//! - **Pastes**: the most recent surface switch into the editor is taken as
//!   the source, with a confidence that decays linearly over the decision
//!   window and is biased per source surface.
//!
//! The paste heuristic is an estimate, not a proof. It only guarantees
//! monotonic decay with elapsed time and stable per-source biases.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::activity_log::ActivityLog;
use crate::focus::FocusTracker;
use crate::surface::Surface;
use crate::types::{ActivityId, Confidence};

/// Activities this recent are linked to a finalized paragraph.
pub const PARAGRAPH_LOOKBACK_MINUTES: i64 = 15;

/// Switches older than this give a fixed low confidence.
pub const PASTE_DECISION_WINDOW_MS: i64 = 30_000;

/// Confidence assigned when the last switch is outside the decision window.
pub const STALE_SWITCH_CONFIDENCE: f32 = 0.3;

/// Bounds for a confidence derived from a switch inside the window.
pub const MIN_PASTE_CONFIDENCE: f32 = 0.1;
pub const MAX_PASTE_CONFIDENCE: f32 = 1.0;

/// Label used for pastes with no attributable source.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// The look-back window for paragraph sources.
pub fn paragraph_lookback() -> Duration {
    Duration::minutes(PARAGRAPH_LOOKBACK_MINUTES)
}

/// Best guess at where a pasted snippet came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEstimate {
    /// The surface the user switched away from, if any.
    pub source: Option<Surface>,
    pub confidence: Confidence,
    #[serde(with = "millis")]
    pub time_since_tab_switch: Duration,
}

impl SourceEstimate {
    /// The fallback used when nothing can be attributed.
    pub fn unknown() -> Self {
        Self {
            source: None,
            confidence: Confidence::MIN,
            time_since_tab_switch: Duration::zero(),
        }
    }

    pub fn source_label(&self) -> &str {
        self.source.as_ref().map_or(UNKNOWN_SOURCE, Surface::as_str)
    }
}

/// Estimates the source of a paste into the editor at `now`.
///
/// Returns [`SourceEstimate::unknown`] unless the editor is focused and at
/// least one switch has been recorded.
#[allow(clippy::cast_precision_loss)]
pub fn estimate_source(tracker: &FocusTracker, now: DateTime<Utc>) -> SourceEstimate {
    if !tracker.current().is_some_and(Surface::is_editor) {
        return SourceEstimate::unknown();
    }
    let Some(last) = tracker.last_switch() else {
        return SourceEstimate::unknown();
    };

    let elapsed = now - last.timestamp;
    let elapsed_ms = elapsed.num_milliseconds();

    let confidence = if elapsed_ms > PASTE_DECISION_WINDOW_MS {
        Confidence::clamped(STALE_SWITCH_CONFIDENCE)
    } else {
        let decayed = 1.0 - (elapsed_ms as f32 / PASTE_DECISION_WINDOW_MS as f32);
        Confidence::clamped_between(
            decayed * last.from.source_multiplier(),
            MIN_PASTE_CONFIDENCE,
            MAX_PASTE_CONFIDENCE,
        )
    };

    tracing::debug!(
        source = %last.from,
        elapsed_ms,
        confidence = %confidence,
        "estimated paste source"
    );

    SourceEstimate {
        source: Some(last.from.clone()),
        confidence,
        time_since_tab_switch: elapsed,
    }
}

/// Sources for a paragraph finalized at `now`: every activity in the
/// look-back window, oldest first.
pub fn paragraph_sources(activities: &ActivityLog, now: DateTime<Utc>) -> Vec<ActivityId> {
    activities
        .recent_since(paragraph_lookback(), now)
        .into_iter()
        .map(|activity| activity.id.clone())
        .collect()
}

/// Serializes a [`Duration`] as whole milliseconds.
mod millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(d.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(Duration::milliseconds)
    }
}
