//! The attribution engine: one explicit context object owning every store.
//!
//! Inbound UI and browser signals arrive as [`ObservedEvent`]s and are handled
//! synchronously, in delivery order. Persistence happens inline after each
//! mutation; failures are logged and never reach the caller.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ActionEntry;
use crate::activity::{Activity, ActivityPayload};
use crate::activity_log::ActivityLog;
use crate::attribution::{self, SourceEstimate};
use crate::debounce::Debouncer;
use crate::focus::{FocusTracker, TabSwitch};
use crate::paragraph::{Paragraph, ParagraphLog, ParagraphSegmenter, is_paragraph_boundary};
use crate::stats::{DebugSnapshot, Statistics};
use crate::storage::{
    ACTIVITIES_KEY, KeyValueStore, PARAGRAPHS_KEY, SAVED_TEXT_KEY, load_or_default,
    persist_or_log, remove_or_log,
};
use crate::surface::Surface;
use crate::types::ParagraphId;
use crate::url_filter::should_log_navigation;

/// Delay between the last editor input and the autosave.
pub const AUTOSAVE_DELAY_SECS: i64 = 5;

/// Action-log source of submitted searches.
pub const SEARCH_ACTION_SOURCE: &str = "Google";

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Whether activities are recorded from the start.
    pub tracking_enabled: bool,
    pub autosave_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tracking_enabled: true,
            autosave_delay: Duration::seconds(AUTOSAVE_DELAY_SECS),
        }
    }
}

/// The closed set of signals the shell relays into the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObservedEvent {
    /// The user brought a surface to the front.
    SurfaceFocused { surface: Surface },
    /// A prompt was sent to the chat assistant.
    PromptSubmitted {
        prompt: String,
        #[serde(default)]
        response: String,
        #[serde(default)]
        model: Option<String>,
    },
    /// A query was submitted to the search surface.
    SearchSubmitted {
        query: String,
        #[serde(default)]
        clicked_url: Option<String>,
    },
    /// A page finished loading in a browsing surface.
    PageLoaded {
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        duration_secs: u64,
        #[serde(default)]
        surface: Option<Surface>,
    },
    /// Navigation began in a browsing surface.
    NavigationStarted {
        url: String,
        #[serde(default)]
        surface: Option<Surface>,
    },
    /// A toolbar navigation button was pressed.
    NavigationControl {
        control: NavigationControl,
        #[serde(default)]
        surface: Option<Surface>,
    },
    /// A URL was entered in the arbitrary-URL bar.
    UrlLoaded { url: String },
    /// Text was copied inside a browsing surface (relayed over the bridge).
    TextCopied {
        text: String,
        url: String,
        #[serde(default)]
        title: String,
    },
    /// The editor's full text after an input.
    EditorInput { content: String },
    /// A selection was copied out of the editor.
    EditorCopied { text: String },
    /// Text was pasted into the editor.
    EditorPasted { text: String },
    /// The user saved the editor explicitly.
    EditorSaved,
    /// The user cleared the editor.
    EditorCleared,
}

/// Toolbar buttons of a browsing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationControl {
    Back,
    Forward,
    Refresh,
    Home,
}

impl NavigationControl {
    /// Action name written to the action log.
    pub const fn action(self) -> &'static str {
        match self {
            Self::Back => "navigation_back",
            Self::Forward => "navigation_forward",
            Self::Refresh => "navigation_refresh",
            Self::Home => "navigation_home",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Back => "Go back button clicked",
            Self::Forward => "Go forward button clicked",
            Self::Refresh => "Refresh button clicked",
            Self::Home => "Home button clicked",
        }
    }
}

/// An observed event with its delivery time; `at` defaults to now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub event: ObservedEvent,
}

/// Everything an event produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub activity: Option<Activity>,
    pub paragraph: Option<Paragraph>,
    pub action: Option<ActionEntry>,
}

/// Engine state. Construct once at startup and pass by reference.
pub struct AttributionEngine<S> {
    store: S,
    activities: ActivityLog,
    paragraphs: ParagraphLog,
    segmenter: ParagraphSegmenter,
    focus: FocusTracker,
    tracking: bool,
    editor_text: String,
    autosave: Debouncer,
}

impl<S: KeyValueStore> AttributionEngine<S> {
    /// Loads persisted state from `store`.
    ///
    /// Missing or unreadable documents yield empty collections.
    pub fn load(store: S, config: &EngineConfig) -> Self {
        let activities: ActivityLog = load_or_default(&store, ACTIVITIES_KEY);
        let paragraphs: ParagraphLog = load_or_default(&store, PARAGRAPHS_KEY);
        let editor_text: String = load_or_default(&store, SAVED_TEXT_KEY);

        tracing::info!(
            activities = activities.len(),
            paragraphs = paragraphs.len(),
            tracking = config.tracking_enabled,
            "attribution engine loaded"
        );

        Self {
            store,
            activities,
            paragraphs,
            segmenter: ParagraphSegmenter::new(),
            focus: FocusTracker::new(),
            tracking: config.tracking_enabled,
            editor_text,
            autosave: Debouncer::new(config.autosave_delay),
        }
    }

    // ========== Tracking ==========

    pub fn start_tracking(&mut self) {
        self.tracking = true;
        tracing::info!("attribution tracking started");
    }

    pub fn stop_tracking(&mut self) {
        self.tracking = false;
        tracing::info!("attribution tracking stopped");
    }

    pub const fn is_tracking(&self) -> bool {
        self.tracking
    }

    // ========== Activity store ==========

    /// Records an activity now. See [`Self::record_at`].
    pub fn record(&mut self, payload: ActivityPayload) -> Option<Activity> {
        self.record_at(payload, Utc::now())
    }

    /// Records an activity at `now`, truncating its text fields and
    /// persisting the whole log. Returns `None` while tracking is off.
    pub fn record_at(&mut self, payload: ActivityPayload, now: DateTime<Utc>) -> Option<Activity> {
        if !self.tracking {
            return None;
        }
        let activity = self.activities.push(Activity::new(payload, now));
        tracing::debug!(
            activity_id = %activity.id,
            activity_type = %activity.activity_type(),
            "activity recorded"
        );
        persist_or_log(&mut self.store, ACTIVITIES_KEY, &self.activities);
        Some(activity)
    }

    /// Activities no older than `window`, in insertion order.
    pub fn recent_since(&self, window: Duration) -> Vec<&Activity> {
        self.activities.recent_since(window, Utc::now())
    }

    pub const fn activities(&self) -> &ActivityLog {
        &self.activities
    }

    pub const fn paragraphs(&self) -> &ParagraphLog {
        &self.paragraphs
    }

    pub fn paragraph(&self, id: &ParagraphId) -> Option<&Paragraph> {
        self.paragraphs.get(id)
    }

    /// Empties both stores, drops the open paragraph and erases persisted state.
    pub fn clear(&mut self) {
        self.activities.clear();
        self.paragraphs.clear();
        self.segmenter.discard();
        remove_or_log(&mut self.store, ACTIVITIES_KEY);
        remove_or_log(&mut self.store, PARAGRAPHS_KEY);
        tracing::info!("all attribution data cleared");
    }

    // ========== Paragraphs ==========

    /// Opens a paragraph unless one is already open.
    pub fn start_paragraph(&mut self, initial: &str, now: DateTime<Utc>) -> &Paragraph {
        self.segmenter.start(initial, now)
    }

    /// Updates the open paragraph, opening one if needed.
    pub fn update_paragraph(&mut self, content: &str, now: DateTime<Utc>) -> &Paragraph {
        self.segmenter.update(content, now)
    }

    pub const fn current_paragraph(&self) -> Option<&Paragraph> {
        self.segmenter.current()
    }

    /// Finalizes the open paragraph now. See [`Self::end_paragraph_at`].
    pub fn end_paragraph(&mut self) -> Option<Paragraph> {
        self.end_paragraph_at(Utc::now())
    }

    /// Finalizes the open paragraph, linking every activity from the
    /// look-back window, and persists the paragraph log.
    ///
    /// Returns `None` and leaves the store untouched when nothing is open.
    pub fn end_paragraph_at(&mut self, now: DateTime<Utc>) -> Option<Paragraph> {
        if self.segmenter.current().is_none() {
            return None;
        }
        let sources = attribution::paragraph_sources(&self.activities, now);
        let paragraph = self.segmenter.finish(sources, now)?;

        tracing::info!(
            paragraph_id = %paragraph.id,
            word_count = paragraph.word_count,
            sources = paragraph.sources.len(),
            "paragraph ended"
        );

        self.paragraphs.push(paragraph.clone());
        persist_or_log(&mut self.store, PARAGRAPHS_KEY, &self.paragraphs);
        Some(paragraph)
    }

    // ========== Focus and attribution ==========

    pub fn focus_surface(&mut self, surface: Surface, now: DateTime<Utc>) -> Option<TabSwitch> {
        self.focus.focus(surface, now)
    }

    pub const fn focus(&self) -> &FocusTracker {
        &self.focus
    }

    /// Estimates the source of a paste happening at `now`.
    pub fn estimate_paste_source(&self, now: DateTime<Utc>) -> SourceEstimate {
        attribution::estimate_source(&self.focus, now)
    }

    // ========== Reporting ==========

    pub fn statistics(&self) -> Statistics {
        Statistics::compute(&self.activities, &self.paragraphs)
    }

    pub fn debug_snapshot(&self, now: DateTime<Utc>) -> DebugSnapshot {
        DebugSnapshot::capture(&self.activities, &self.paragraphs, &self.focus, now)
    }

    // ========== Editor ==========

    pub fn editor_text(&self) -> &str {
        &self.editor_text
    }

    /// Fires the autosave when its deadline has passed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<ActionEntry> {
        self.autosave.poll(now).then(|| self.save_editor_text(now))
    }

    fn save_editor_text(&mut self, now: DateTime<Utc>) -> ActionEntry {
        self.autosave.cancel();
        persist_or_log(&mut self.store, SAVED_TEXT_KEY, &self.editor_text);
        tracing::debug!(length = self.editor_text.len(), "editor text saved");
        ActionEntry::new("Text Editor", "text_saved", &self.editor_text, now)
            .with("text_length", self.editor_text.chars().count())
    }

    /// Applies an editor input: the paragraph being written is the text
    /// after the last blank-line break, and two trailing newlines close it.
    fn editor_input(&mut self, content: String, now: DateTime<Utc>) -> Option<Paragraph> {
        self.autosave.trigger(now);
        let boundary = is_paragraph_boundary(&content);
        let segment = current_segment(&content).to_string();
        self.editor_text = content;

        if !boundary {
            self.segmenter.update(&segment, now);
            return None;
        }
        if segment.trim().is_empty() {
            self.segmenter.discard();
            return None;
        }
        if self.segmenter.current().is_none() && self.is_last_paragraph(&segment) {
            // Extra newlines after a paragraph already closed
            return None;
        }
        self.segmenter.update(&segment, now);
        self.end_paragraph_at(now)
    }

    fn is_last_paragraph(&self, segment: &str) -> bool {
        self.paragraphs
            .all()
            .last()
            .is_some_and(|paragraph| paragraph.content == segment)
    }

    // ========== Event boundary ==========

    /// Reacts to one observed event.
    pub fn observe(&mut self, event: ObservedEvent, now: DateTime<Utc>) -> Reaction {
        match event {
            ObservedEvent::SurfaceFocused { surface } => {
                let from = self.focus.current().cloned();
                let content = format!("Switched to {surface} tab");
                self.focus.focus(surface.clone(), now);
                let mut action = ActionEntry::new("UI", "tab_switched", &content, now);
                if let Some(from) = &from {
                    action = action.with("from_tab", from.as_str());
                }
                Reaction {
                    activity: self.record_at(ActivityPayload::tab_switched(from, surface), now),
                    action: Some(action),
                    ..Reaction::default()
                }
            }
            ObservedEvent::PromptSubmitted {
                prompt,
                response,
                model,
            } => Reaction {
                activity: self.record_at(
                    ActivityPayload::prompt(&prompt, &response, model.as_deref()),
                    now,
                ),
                ..Reaction::default()
            },
            ObservedEvent::SearchSubmitted { query, clicked_url } => Reaction {
                action: Some(ActionEntry::new(
                    SEARCH_ACTION_SOURCE,
                    "search_submitted",
                    &query,
                    now,
                )),
                activity: self.record_at(
                    ActivityPayload::search(&query, clicked_url.as_deref()),
                    now,
                ),
                ..Reaction::default()
            },
            ObservedEvent::PageLoaded {
                url,
                title,
                duration_secs,
                surface,
            } => {
                if !should_log_navigation(&url) {
                    return Reaction::default();
                }
                let source = browser_source(surface.as_ref());
                let action =
                    ActionEntry::new(source, "page_loaded", &url, now).with("title", title.as_str());
                Reaction {
                    activity: self.record_at(
                        ActivityPayload::website_visit(&url, &title, duration_secs),
                        now,
                    ),
                    action: Some(action),
                    ..Reaction::default()
                }
            }
            ObservedEvent::NavigationStarted { url, surface } => {
                if !should_log_navigation(&url) {
                    return Reaction::default();
                }
                Reaction {
                    action: Some(ActionEntry::new(
                        browser_source(surface.as_ref()),
                        "navigation_started",
                        &url,
                        now,
                    )),
                    ..Reaction::default()
                }
            }
            ObservedEvent::NavigationControl { control, surface } => Reaction {
                action: Some(ActionEntry::new(
                    browser_source(surface.as_ref()),
                    control.action(),
                    control.description(),
                    now,
                )),
                ..Reaction::default()
            },
            ObservedEvent::UrlLoaded { url } => {
                let url = url.trim();
                if url.is_empty() {
                    return Reaction::default();
                }
                Reaction {
                    action: Some(ActionEntry::new("Custom", "url_loaded", url, now)),
                    ..Reaction::default()
                }
            }
            ObservedEvent::TextCopied { text, url, title } => Reaction {
                activity: self.record_at(ActivityPayload::copied_text(&text, &url, &title), now),
                ..Reaction::default()
            },
            ObservedEvent::EditorInput { content } => Reaction {
                paragraph: self.editor_input(content, now),
                ..Reaction::default()
            },
            ObservedEvent::EditorCopied { text } => {
                if text.trim().is_empty() {
                    return Reaction::default();
                }
                Reaction {
                    activity: self.record_at(ActivityPayload::editor_copied(&text), now),
                    ..Reaction::default()
                }
            }
            ObservedEvent::EditorPasted { text } => {
                if text.trim().is_empty() {
                    return Reaction::default();
                }
                let estimate = self.estimate_paste_source(now);
                let action = ActionEntry::new("TextEditor", "text_pasted", &text, now)
                    .with("estimated_source", estimate.source_label())
                    .with("confidence", f64::from(estimate.confidence.value()))
                    .with(
                        "time_since_tab_switch_ms",
                        estimate.time_since_tab_switch.num_milliseconds(),
                    );
                Reaction {
                    activity: self.record_at(ActivityPayload::editor_pasted(&text, &estimate), now),
                    action: Some(action),
                    ..Reaction::default()
                }
            }
            ObservedEvent::EditorSaved => Reaction {
                action: Some(self.save_editor_text(now)),
                ..Reaction::default()
            },
            ObservedEvent::EditorCleared => {
                self.editor_text.clear();
                self.segmenter.discard();
                Reaction {
                    action: Some(self.save_editor_text(now)),
                    ..Reaction::default()
                }
            }
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// Action-log source for a browsing surface; `Browser` when unknown.
fn browser_source(surface: Option<&Surface>) -> &str {
    surface.map_or("Browser", Surface::as_str)
}

/// The text after the last blank-line break, ignoring trailing newlines.
fn current_segment(content: &str) -> &str {
    let body = content.trim_end_matches('\n');
    body.rfind("\n\n").map_or(body, |idx| &body[idx + 2..])
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::activity_type::ActivityType;
    use crate::storage::MemoryStore;

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn engine() -> AttributionEngine<MemoryStore> {
        AttributionEngine::load(MemoryStore::new(), &EngineConfig::default())
    }

    fn input(engine: &mut AttributionEngine<MemoryStore>, content: &str, at: i64) -> Reaction {
        engine.observe(
            ObservedEvent::EditorInput {
                content: content.to_string(),
            },
            ts(at),
        )
    }

    #[test]
    fn current_segment_skips_earlier_paragraphs() {
        assert_eq!(current_segment("one"), "one");
        assert_eq!(current_segment("one\n\n"), "one");
        assert_eq!(current_segment("one\n\ntwo"), "two");
        assert_eq!(current_segment("one\n\n\ntwo\nmore\n\n"), "two\nmore");
        assert_eq!(current_segment(""), "");
    }

    #[test]
    fn record_is_noop_while_tracking_disabled() {
        let mut engine = engine();
        engine.stop_tracking();

        let recorded = engine.record_at(ActivityPayload::search("q", None), ts(0));

        assert!(recorded.is_none());
        assert!(engine.activities().is_empty());
        assert!(engine.store().get(ACTIVITIES_KEY).unwrap().is_none());

        engine.start_tracking();
        assert!(engine.record_at(ActivityPayload::search("q", None), ts(0)).is_some());
    }

    #[test]
    fn record_persists_full_log() {
        let mut engine = engine();
        engine.record_at(ActivityPayload::search("a", None), ts(0));
        engine.record_at(ActivityPayload::search("b", None), ts(1));

        let stored = engine.store().get(ACTIVITIES_KEY).unwrap().unwrap();
        let parsed: ActivityLog = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn record_truncates_query() {
        let mut engine = engine();
        let activity = engine
            .record_at(ActivityPayload::search(&"q".repeat(300), None), ts(0))
            .unwrap();
        assert_eq!(activity.summary().chars().count(), crate::activity::QUERY_CAP);
    }

    #[test]
    fn reload_reproduces_identical_sequence() {
        let mut engine = engine();
        engine.record_at(ActivityPayload::prompt("p", "r", Some("o1")), ts(0));
        engine.record_at(ActivityPayload::copied_text("t", "https://a.example", "A"), ts(1));
        engine.update_paragraph("hello world", ts(2));
        engine.end_paragraph_at(ts(3)).unwrap();

        let original_activities = engine.activities().clone();
        let original_paragraphs = engine.paragraphs().clone();

        let reloaded = AttributionEngine::load(engine.into_store(), &EngineConfig::default());
        assert_eq!(reloaded.activities(), &original_activities);
        assert_eq!(reloaded.paragraphs(), &original_paragraphs);
    }

    #[test]
    fn malformed_state_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(ACTIVITIES_KEY, "[{\"broken\":").unwrap();
        store.set(PARAGRAPHS_KEY, "42").unwrap();

        let engine = AttributionEngine::load(store, &EngineConfig::default());
        assert!(engine.activities().is_empty());
        assert!(engine.paragraphs().is_empty());
    }

    #[test]
    fn end_without_open_paragraph_leaves_store_untouched() {
        let mut engine = engine();
        assert!(engine.end_paragraph_at(ts(0)).is_none());
        assert!(engine.paragraphs().is_empty());
        assert!(engine.store().get(PARAGRAPHS_KEY).unwrap().is_none());
    }

    #[test]
    fn end_links_activities_from_last_fifteen_minutes() {
        let mut engine = engine();
        let old = engine
            .record_at(ActivityPayload::search("old", None), ts(-16 * 60))
            .unwrap();
        let recent = engine
            .record_at(ActivityPayload::search("recent", None), ts(-14 * 60))
            .unwrap();

        engine.update_paragraph("draft", ts(-60));
        let paragraph = engine.end_paragraph_at(ts(0)).unwrap();

        assert_eq!(paragraph.sources, vec![recent.id]);
        assert!(!paragraph.sources.contains(&old.id));
        assert_eq!(paragraph.duration_minutes, Some(1));
        assert_eq!(engine.paragraph(&paragraph.id), Some(&paragraph));
        assert!(engine.current_paragraph().is_none());
    }

    #[test]
    fn editor_input_closes_paragraph_on_blank_line() {
        let mut engine = engine();
        engine.observe(
            ObservedEvent::SearchSubmitted {
                query: "borrow checker".into(),
                clicked_url: None,
            },
            ts(0),
        );

        assert!(input(&mut engine, "Ownership", 1).paragraph.is_none());
        assert!(input(&mut engine, "Ownership rules\n", 2).paragraph.is_none());
        let closed = input(&mut engine, "Ownership rules\n\n", 3).paragraph.unwrap();

        assert_eq!(closed.content, "Ownership rules");
        assert_eq!(closed.word_count, 2);
        assert_eq!(closed.sources.len(), 1);

        // Further newlines do not produce an empty paragraph
        assert!(input(&mut engine, "Ownership rules\n\n\n", 4).paragraph.is_none());
        assert_eq!(engine.paragraphs().len(), 1);

        input(&mut engine, "Ownership rules\n\n\nBorrowing", 5);
        assert_eq!(engine.current_paragraph().unwrap().content, "Borrowing");
        let second = input(&mut engine, "Ownership rules\n\n\nBorrowing\n\n", 6)
            .paragraph
            .unwrap();
        assert_eq!(second.content, "Borrowing");
        assert_eq!(engine.paragraphs().len(), 2);
    }

    #[test]
    fn blank_line_closes_paragraph_typed_in_one_input() {
        let mut engine = engine();
        let closed = input(&mut engine, "Whole paragraph\n\n", 0)
            .paragraph
            .unwrap();

        assert_eq!(closed.content, "Whole paragraph");
        assert_eq!(engine.paragraphs().len(), 1);
        assert!(engine.current_paragraph().is_none());
    }

    #[test]
    fn pasted_paragraph_after_closed_one_is_kept() {
        let mut engine = engine();
        input(&mut engine, "First", 0);
        input(&mut engine, "First\n\n", 1).paragraph.unwrap();

        let second = input(&mut engine, "First\n\nSecond para pasted\n\n", 2)
            .paragraph
            .unwrap();

        assert_eq!(second.content, "Second para pasted");
        assert_eq!(engine.paragraphs().len(), 2);
    }

    #[test]
    fn paste_records_estimate_and_action() {
        let mut engine = engine();
        engine.observe(ObservedEvent::SurfaceFocused { surface: Surface::Search }, ts(0));
        engine.observe(ObservedEvent::SurfaceFocused { surface: Surface::Editor }, ts(10));

        let reaction = engine.observe(
            ObservedEvent::EditorPasted {
                text: "copied from results".into(),
            },
            ts(15),
        );

        let activity = reaction.activity.unwrap();
        let paste = activity.paste().unwrap();
        assert_eq!(paste.estimated_source, "search");
        assert!((paste.confidence.value() - 0.833).abs() < 1e-3);
        assert_eq!(paste.time_since_tab_switch_ms, 5000);

        let action = reaction.action.unwrap();
        assert_eq!(action.action, "text_pasted");
        assert_eq!(action.extra["estimated_source"], "search");
    }

    #[test]
    fn paste_outside_editor_is_unknown() {
        let mut engine = engine();
        engine.observe(ObservedEvent::SurfaceFocused { surface: Surface::Chat }, ts(0));

        let reaction = engine.observe(ObservedEvent::EditorPasted { text: "x".into() }, ts(1));
        let activity = reaction.activity.unwrap();
        let paste = activity.paste().unwrap();
        assert_eq!(paste.estimated_source, "Unknown");
        assert_eq!(paste.confidence.percent(), 0);
    }

    #[test]
    fn blank_copy_and_paste_are_ignored() {
        let mut engine = engine();
        let copied = engine.observe(ObservedEvent::EditorCopied { text: "  ".into() }, ts(0));
        let pasted = engine.observe(ObservedEvent::EditorPasted { text: "\n".into() }, ts(0));

        assert_eq!(copied, Reaction::default());
        assert_eq!(pasted, Reaction::default());
        assert!(engine.activities().is_empty());
    }

    #[test]
    fn surface_focus_records_tab_switch() {
        let mut engine = engine();
        let first = engine.observe(ObservedEvent::SurfaceFocused { surface: Surface::Chat }, ts(0));
        let second = engine.observe(ObservedEvent::SurfaceFocused { surface: Surface::Editor }, ts(1));

        assert!(!first.action.unwrap().extra.contains_key("from_tab"));
        let action = second.action.unwrap();
        assert_eq!(action.content, "Switched to editor tab");
        assert_eq!(action.extra["from_tab"], "chat");

        assert_eq!(engine.focus().history_len(), 1);
        assert_eq!(
            engine.statistics().source_types.get(&ActivityType::TabSwitched),
            Some(&2)
        );
    }

    #[test]
    fn tracking_pages_are_not_recorded() {
        let mut engine = engine();
        let filtered = engine.observe(
            ObservedEvent::PageLoaded {
                url: "https://stats.g.doubleclick.net/collect?v=1".into(),
                title: String::new(),
                duration_secs: 0,
                surface: Some(Surface::Custom),
            },
            ts(0),
        );
        assert_eq!(filtered, Reaction::default());

        let logged = engine.observe(
            ObservedEvent::PageLoaded {
                url: "https://doc.rust-lang.org/book/".into(),
                title: "The Book".into(),
                duration_secs: 12,
                surface: Some(Surface::Custom),
            },
            ts(1),
        );
        assert_eq!(
            logged.activity.unwrap().activity_type(),
            ActivityType::WebsiteVisit
        );
        assert_eq!(logged.action.unwrap().source, "custom");
    }

    #[test]
    fn search_submission_logs_action_without_tracking() {
        let mut engine = AttributionEngine::load(
            MemoryStore::new(),
            &EngineConfig {
                tracking_enabled: false,
                ..EngineConfig::default()
            },
        );
        let reaction = engine.observe(
            ObservedEvent::SearchSubmitted {
                query: "rust lifetimes".into(),
                clicked_url: None,
            },
            ts(0),
        );

        assert!(reaction.activity.is_none());
        let action = reaction.action.unwrap();
        assert_eq!(action.source, "Google");
        assert_eq!(action.action, "search_submitted");
        assert_eq!(action.content, "rust lifetimes");
    }

    #[test]
    fn page_load_logs_page_loaded_action() {
        let mut engine = engine();
        let action = engine
            .observe(
                ObservedEvent::PageLoaded {
                    url: "https://www.google.com/search?q=rust".into(),
                    title: "rust - Google Search".into(),
                    duration_secs: 3,
                    surface: Some(Surface::Search),
                },
                ts(0),
            )
            .action
            .unwrap();

        assert_eq!(action.source, "search");
        assert_eq!(action.action, "page_loaded");
        assert_eq!(action.content, "https://www.google.com/search?q=rust");
    }

    #[test]
    fn navigation_start_skips_tracking_urls() {
        let mut engine = engine();
        let filtered = engine.observe(
            ObservedEvent::NavigationStarted {
                url: "https://www.google-analytics.com/collect".into(),
                surface: Some(Surface::Chat),
            },
            ts(0),
        );
        assert_eq!(filtered, Reaction::default());

        let logged = engine.observe(
            ObservedEvent::NavigationStarted {
                url: "https://www.rust-lang.org/learn".into(),
                surface: Some(Surface::Chat),
            },
            ts(1),
        );
        assert!(logged.activity.is_none());
        let action = logged.action.unwrap();
        assert_eq!(action.source, "chat");
        assert_eq!(action.action, "navigation_started");
        assert_eq!(action.content, "https://www.rust-lang.org/learn");
    }

    #[test]
    fn navigation_controls_log_button_clicks() {
        let mut engine = engine();
        let logged: Vec<(String, String)> = [
            NavigationControl::Back,
            NavigationControl::Forward,
            NavigationControl::Refresh,
            NavigationControl::Home,
        ]
        .into_iter()
        .map(|control| {
            let action = engine
                .observe(
                    ObservedEvent::NavigationControl {
                        control,
                        surface: Some(Surface::Search),
                    },
                    ts(0),
                )
                .action
                .unwrap();
            assert_eq!(action.source, "search");
            (action.action, action.content)
        })
        .collect();

        assert_eq!(
            logged,
            vec![
                ("navigation_back".into(), "Go back button clicked".into()),
                ("navigation_forward".into(), "Go forward button clicked".into()),
                ("navigation_refresh".into(), "Refresh button clicked".into()),
                ("navigation_home".into(), "Home button clicked".into()),
            ]
        );
        assert!(engine.activities().is_empty());
    }

    #[test]
    fn bridge_copy_records_text_copied() {
        let mut engine = engine();
        let reaction = engine.observe(
            ObservedEvent::TextCopied {
                text: "quoted passage".into(),
                url: "https://example.com/article".into(),
                title: "Article".into(),
            },
            ts(0),
        );
        let activity = reaction.activity.unwrap();
        assert_eq!(activity.activity_type(), ActivityType::TextCopied);
        assert_eq!(activity.summary(), "quoted passage");
    }

    #[test]
    fn autosave_fires_after_quiet_period() {
        let mut engine = engine();
        input(&mut engine, "draft", 0);
        input(&mut engine, "draft two", 3);

        assert!(engine.tick(ts(5)).is_none());
        let saved = engine.tick(ts(8)).unwrap();
        assert_eq!(saved.action, "text_saved");
        assert_eq!(saved.content, "draft two");
        assert!(engine.tick(ts(20)).is_none());

        let stored: Option<String> =
            crate::storage::load_document(engine.store(), SAVED_TEXT_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some("draft two"));
    }

    #[test]
    fn saved_text_is_restored_on_load() {
        let mut engine = engine();
        input(&mut engine, "keep me", 0);
        engine.observe(ObservedEvent::EditorSaved, ts(1));

        let reloaded = AttributionEngine::load(engine.into_store(), &EngineConfig::default());
        assert_eq!(reloaded.editor_text(), "keep me");
    }

    #[test]
    fn clear_erases_everything() {
        let mut engine = engine();
        engine.record_at(ActivityPayload::search("q", None), ts(0));
        engine.update_paragraph("text", ts(0));
        engine.end_paragraph_at(ts(1));
        engine.update_paragraph("open", ts(2));

        engine.clear();

        assert!(engine.activities().is_empty());
        assert!(engine.paragraphs().is_empty());
        assert!(engine.current_paragraph().is_none());
        assert!(engine.store().get(ACTIVITIES_KEY).unwrap().is_none());
        assert!(engine.store().get(PARAGRAPHS_KEY).unwrap().is_none());
    }

    #[test]
    fn timed_event_parses_flat_json() {
        let line = r#"{"at":"2025-01-29T12:00:05Z","kind":"surface_focused","surface":"google"}"#;
        let event: TimedEvent = serde_json::from_str(line).unwrap();

        assert_eq!(event.at, Some(ts(5)));
        assert_eq!(
            event.event,
            ObservedEvent::SurfaceFocused {
                surface: Surface::Search
            }
        );

        let control: TimedEvent =
            serde_json::from_str(r#"{"kind":"navigation_control","control":"back","surface":"search"}"#)
                .unwrap();
        assert_eq!(
            control.event,
            ObservedEvent::NavigationControl {
                control: NavigationControl::Back,
                surface: Some(Surface::Search),
            }
        );

        let bare: TimedEvent = serde_json::from_str(r#"{"kind":"editor_saved"}"#).unwrap();
        assert!(bare.at.is_none());
        assert_eq!(bare.event, ObservedEvent::EditorSaved);
    }
}
