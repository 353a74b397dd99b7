//! Derived statistics and debug snapshots.
//!
//! Everything here is recomputed on demand from the stores; nothing is
//! maintained incrementally.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::activity_log::ActivityLog;
use crate::activity_type::ActivityType;
use crate::focus::FocusTracker;
use crate::paragraph::ParagraphLog;
use crate::surface::Surface;
use crate::types::{Confidence, ParagraphId};

/// Aggregate counts over both stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_paragraphs: usize,
    pub total_activities: usize,
    pub total_words: usize,
    pub total_characters: usize,
    pub source_types: BTreeMap<ActivityType, usize>,
    pub average_words_per_paragraph: usize,
}

impl Statistics {
    pub fn compute(activities: &ActivityLog, paragraphs: &ParagraphLog) -> Self {
        let mut source_types = BTreeMap::new();
        for activity in activities.all() {
            *source_types.entry(activity.activity_type()).or_insert(0) += 1;
        }

        let total_words = paragraphs.all().iter().map(|p| p.word_count).sum();
        let total_characters = paragraphs.all().iter().map(|p| p.character_count).sum();

        Self {
            total_paragraphs: paragraphs.len(),
            total_activities: activities.len(),
            total_words,
            total_characters,
            source_types,
            average_words_per_paragraph: rounded_average(total_words, paragraphs.len()),
        }
    }
}

/// `round(total / count)` with halves rounding up; zero when `count` is zero.
fn rounded_average(total: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (2 * total + count) / (2 * count)
}

/// `round(ms / 1000)`.
const fn rounded_seconds(ms: i64) -> i64 {
    (ms + 500).div_euclid(1000)
}

/// Number of recent activities shown in a debug snapshot.
pub const DEBUG_RECENT_ACTIVITIES: usize = 5;
/// Number of recent tab switches shown in a debug snapshot.
pub const DEBUG_RECENT_SWITCHES: usize = 3;
/// Number of recent paragraphs shown in a debug snapshot.
pub const DEBUG_RECENT_PARAGRAPHS: usize = 3;
/// Number of recent pastes shown in a debug snapshot.
pub const DEBUG_RECENT_PASTES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub activity_type: ActivityType,
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchSummary {
    pub from: Surface,
    pub to: Surface,
    pub seconds_ago: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphSummary {
    pub id: ParagraphId,
    pub word_count: usize,
    pub source_count: usize,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasteSummary {
    pub timestamp: DateTime<Utc>,
    pub estimated_source: String,
    pub confidence: Confidence,
    pub seconds_after_switch: i64,
    pub preview: String,
}

/// Point-in-time view of the engine for the debug panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugSnapshot {
    pub statistics: Statistics,
    /// Oldest first.
    pub recent_activities: Vec<ActivitySummary>,
    /// Newest first.
    pub recent_switches: Vec<SwitchSummary>,
    pub current_surface: Option<Surface>,
    pub seconds_since_last_switch: Option<i64>,
    /// Oldest first.
    pub recent_paragraphs: Vec<ParagraphSummary>,
    /// Newest first.
    pub recent_pastes: Vec<PasteSummary>,
}

impl DebugSnapshot {
    pub fn capture(
        activities: &ActivityLog,
        paragraphs: &ParagraphLog,
        focus: &FocusTracker,
        now: DateTime<Utc>,
    ) -> Self {
        let recent_activities = activities
            .tail(DEBUG_RECENT_ACTIVITIES)
            .iter()
            .map(|activity| {
                let paste = activity.paste();
                ActivitySummary {
                    activity_type: activity.activity_type(),
                    timestamp: activity.timestamp,
                    summary: activity.summary(),
                    estimated_source: paste.map(|p| p.estimated_source.clone()),
                    confidence: paste.map(|p| p.confidence),
                }
            })
            .collect();

        let recent_switches = focus
            .recent(DEBUG_RECENT_SWITCHES)
            .into_iter()
            .map(|switch| SwitchSummary {
                from: switch.from.clone(),
                to: switch.to.clone(),
                seconds_ago: rounded_seconds((now - switch.timestamp).num_milliseconds()),
            })
            .collect();

        let recent_paragraphs = paragraphs
            .tail(DEBUG_RECENT_PARAGRAPHS)
            .iter()
            .map(|paragraph| ParagraphSummary {
                id: paragraph.id.clone(),
                word_count: paragraph.word_count,
                source_count: paragraph.sources.len(),
                preview: paragraph.preview(100),
            })
            .collect();

        let recent_pastes = activities
            .all()
            .iter()
            .rev()
            .filter_map(|activity| {
                activity.paste().map(|paste| PasteSummary {
                    timestamp: activity.timestamp,
                    estimated_source: paste.estimated_source.clone(),
                    confidence: paste.confidence,
                    seconds_after_switch: rounded_seconds(paste.time_since_tab_switch_ms),
                    preview: crate::activity::ellipsize(&paste.text, 80),
                })
            })
            .take(DEBUG_RECENT_PASTES)
            .collect();

        Self {
            statistics: Statistics::compute(activities, paragraphs),
            recent_activities,
            recent_switches,
            current_surface: focus.current().cloned(),
            seconds_since_last_switch: focus
                .last_switch_time()
                .map(|at| rounded_seconds((now - at).num_milliseconds())),
            recent_paragraphs,
            recent_pastes,
        }
    }
}
