//! Recorded activities and their type-specific payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity_type::ActivityType;
use crate::surface::Surface;
use crate::types::{ActivityId, Confidence};

/// Maximum stored characters of an AI prompt.
pub const PROMPT_CAP: usize = 500;
/// Maximum stored characters of an AI response.
pub const RESPONSE_CAP: usize = 1000;
/// Maximum stored characters of a search query.
pub const QUERY_CAP: usize = 200;
/// Maximum stored characters of a page title.
pub const TITLE_CAP: usize = 100;
/// Maximum stored characters of copied or pasted text.
pub const TEXT_CAP: usize = 500;

/// Model name recorded when the chat surface does not report one.
pub const DEFAULT_MODEL: &str = "GPT-4";

/// One observed action. Immutable once recorded.
///
/// Serialized as `{"id", "type", "timestamp", "data"}` where `data` holds the
/// payload fields for `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawActivity", into = "RawActivity")]
pub struct Activity {
    pub id: ActivityId,
    pub timestamp: DateTime<Utc>,
    pub payload: ActivityPayload,
}

impl Activity {
    /// Builds an activity with a fresh ID, applying the payload's length caps.
    pub fn new(payload: ActivityPayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ActivityId::generate(timestamp),
            timestamp,
            payload: payload.truncated(),
        }
    }

    pub const fn activity_type(&self) -> ActivityType {
        self.payload.activity_type()
    }

    /// Short human-readable description for debug views.
    pub fn summary(&self) -> String {
        match &self.payload {
            ActivityPayload::PromptSubmitted(data) => ellipsize(&data.prompt, 50),
            ActivityPayload::Search(data) => data.query.clone(),
            ActivityPayload::WebsiteVisit(data) => data.url.clone(),
            ActivityPayload::TextCopied(data) => ellipsize(&data.text, 50),
            ActivityPayload::TextEditorCopied(data) => ellipsize(&data.text, 50),
            ActivityPayload::TextEditorPasted(data) => ellipsize(&data.text, 50),
            ActivityPayload::TabSwitched(data) => match &data.from {
                Some(from) => format!("{from} -> {}", data.to),
                None => format!("-> {}", data.to),
            },
        }
    }

    /// The paste attribution carried by a `text_editor_pasted` activity.
    pub const fn paste(&self) -> Option<&PasteData> {
        match &self.payload {
            ActivityPayload::TextEditorPasted(data) => Some(data),
            _ => None,
        }
    }
}

/// Type-specific payload of an activity.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityPayload {
    PromptSubmitted(PromptData),
    Search(SearchData),
    WebsiteVisit(VisitData),
    TextCopied(CopiedTextData),
    TextEditorCopied(EditorCopyData),
    TextEditorPasted(PasteData),
    TabSwitched(TabSwitchData),
}

impl ActivityPayload {
    /// An AI prompt and its response. Original lengths are kept alongside the
    /// truncated text.
    pub fn prompt(prompt: &str, response: &str, model: Option<&str>) -> Self {
        Self::PromptSubmitted(PromptData {
            prompt: prompt.to_string(),
            response: response.to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            prompt_length: prompt.chars().count(),
            response_length: response.chars().count(),
        })
    }

    pub fn search(query: &str, clicked_url: Option<&str>) -> Self {
        Self::Search(SearchData {
            query: query.to_string(),
            clicked_url: clicked_url.map(String::from),
        })
    }

    pub fn website_visit(url: &str, title: &str, duration_secs: u64) -> Self {
        Self::WebsiteVisit(VisitData {
            url: url.to_string(),
            title: title.to_string(),
            duration_secs,
        })
    }

    /// Text copied inside one of the browsing surfaces.
    pub fn copied_text(text: &str, url: &str, title: &str) -> Self {
        Self::TextCopied(CopiedTextData {
            text: text.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            text_length: text.chars().count(),
        })
    }

    pub fn editor_copied(text: &str) -> Self {
        Self::TextEditorCopied(EditorCopyData {
            text: text.to_string(),
            text_length: text.chars().count(),
        })
    }

    pub fn editor_pasted(text: &str, estimate: &crate::attribution::SourceEstimate) -> Self {
        Self::TextEditorPasted(PasteData {
            text: text.to_string(),
            text_length: text.chars().count(),
            estimated_source: estimate.source_label().to_string(),
            confidence: estimate.confidence,
            time_since_tab_switch_ms: estimate.time_since_tab_switch.num_milliseconds(),
        })
    }

    pub fn tab_switched(from: Option<Surface>, to: Surface) -> Self {
        Self::TabSwitched(TabSwitchData { from, to })
    }

    pub const fn activity_type(&self) -> ActivityType {
        match self {
            Self::PromptSubmitted(_) => ActivityType::PromptSubmitted,
            Self::Search(_) => ActivityType::Search,
            Self::WebsiteVisit(_) => ActivityType::WebsiteVisit,
            Self::TextCopied(_) => ActivityType::TextCopied,
            Self::TextEditorCopied(_) => ActivityType::TextEditorCopied,
            Self::TextEditorPasted(_) => ActivityType::TextEditorPasted,
            Self::TabSwitched(_) => ActivityType::TabSwitched,
        }
    }

    /// Applies the per-type storage caps to every free-text field.
    #[must_use]
    pub fn truncated(mut self) -> Self {
        match &mut self {
            Self::PromptSubmitted(data) => {
                truncate_chars(&mut data.prompt, PROMPT_CAP);
                truncate_chars(&mut data.response, RESPONSE_CAP);
            }
            Self::Search(data) => truncate_chars(&mut data.query, QUERY_CAP),
            Self::WebsiteVisit(data) => truncate_chars(&mut data.title, TITLE_CAP),
            Self::TextCopied(data) => {
                truncate_chars(&mut data.text, TEXT_CAP);
                truncate_chars(&mut data.title, TITLE_CAP);
            }
            Self::TextEditorCopied(data) => truncate_chars(&mut data.text, TEXT_CAP),
            Self::TextEditorPasted(data) => truncate_chars(&mut data.text, TEXT_CAP),
            Self::TabSwitched(_) => {}
        }
        self
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::PromptSubmitted(data) => serde_json::to_value(data),
            Self::Search(data) => serde_json::to_value(data),
            Self::WebsiteVisit(data) => serde_json::to_value(data),
            Self::TextCopied(data) => serde_json::to_value(data),
            Self::TextEditorCopied(data) => serde_json::to_value(data),
            Self::TextEditorPasted(data) => serde_json::to_value(data),
            Self::TabSwitched(data) => serde_json::to_value(data),
        }
    }

    fn from_value(
        activity_type: ActivityType,
        data: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match activity_type {
            ActivityType::PromptSubmitted => Self::PromptSubmitted(serde_json::from_value(data)?),
            ActivityType::Search => Self::Search(serde_json::from_value(data)?),
            ActivityType::WebsiteVisit => Self::WebsiteVisit(serde_json::from_value(data)?),
            ActivityType::TextCopied => Self::TextCopied(serde_json::from_value(data)?),
            ActivityType::TextEditorCopied => Self::TextEditorCopied(serde_json::from_value(data)?),
            ActivityType::TextEditorPasted => Self::TextEditorPasted(serde_json::from_value(data)?),
            ActivityType::TabSwitched => Self::TabSwitched(serde_json::from_value(data)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptData {
    pub prompt: String,
    pub response: String,
    pub model: String,
    pub prompt_length: usize,
    pub response_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchData {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicked_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitData {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopiedTextData {
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub text_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorCopyData {
    pub text: String,
    pub text_length: usize,
}

/// A paste into the editor together with its estimated source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasteData {
    pub text: String,
    pub text_length: usize,
    pub estimated_source: String,
    pub confidence: Confidence,
    pub time_since_tab_switch_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSwitchData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Surface>,
    pub to: Surface,
}

/// Wire shape of an activity.
#[derive(Serialize, Deserialize)]
struct RawActivity {
    id: ActivityId,
    #[serde(rename = "type")]
    activity_type: ActivityType,
    timestamp: DateTime<Utc>,
    data: serde_json::Value,
}

impl TryFrom<RawActivity> for Activity {
    type Error = serde_json::Error;

    fn try_from(raw: RawActivity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            timestamp: raw.timestamp,
            payload: ActivityPayload::from_value(raw.activity_type, raw.data)?,
        })
    }
}

impl From<Activity> for RawActivity {
    fn from(activity: Activity) -> Self {
        let activity_type = activity.activity_type();
        // Payload structs are plain strings and numbers, so this cannot fail
        let data = activity
            .payload
            .to_value()
            .unwrap_or(serde_json::Value::Null);
        Self {
            id: activity.id,
            activity_type,
            timestamp: activity.timestamp,
            data,
        }
    }
}

/// Truncates `s` to at most `cap` characters.
pub fn truncate_chars(s: &mut String, cap: usize) {
    if let Some((idx, _)) = s.char_indices().nth(cap) {
        s.truncate(idx);
    }
}

/// Returns the first `cap` characters of `s`, followed by `...` when cut.
pub fn ellipsize(s: &str, cap: usize) -> String {
    let mut out = s.to_string();
    truncate_chars(&mut out, cap);
    if out.len() < s.len() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap()
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        let mut s = "가나다라".to_string();
        truncate_chars(&mut s, 2);
        assert_eq!(s, "가나");

        let mut short = "abc".to_string();
        truncate_chars(&mut short, 10);
        assert_eq!(short, "abc");
    }

    #[test]
    fn ellipsize_marks_cut_text() {
        assert_eq!(ellipsize("hello world", 5), "hello...");
        assert_eq!(ellipsize("hello", 5), "hello");
    }

    #[test]
    fn each_cap_stores_exactly_cap_characters() {
        let long = "x".repeat(2000);

        let activity = Activity::new(ActivityPayload::prompt(&long, &long, None), ts());
        let ActivityPayload::PromptSubmitted(data) = &activity.payload else {
            panic!("expected prompt payload");
        };
        assert_eq!(data.prompt.chars().count(), PROMPT_CAP);
        assert_eq!(data.response.chars().count(), RESPONSE_CAP);
        assert_eq!(data.prompt_length, 2000);
        assert_eq!(data.model, DEFAULT_MODEL);

        let activity = Activity::new(ActivityPayload::search(&long, None), ts());
        let ActivityPayload::Search(data) = &activity.payload else {
            panic!("expected search payload");
        };
        assert_eq!(data.query.chars().count(), QUERY_CAP);

        let activity = Activity::new(
            ActivityPayload::copied_text(&long, "https://a.example", &long),
            ts(),
        );
        let ActivityPayload::TextCopied(data) = &activity.payload else {
            panic!("expected copied text payload");
        };
        assert_eq!(data.text.chars().count(), TEXT_CAP);
        assert_eq!(data.title.chars().count(), TITLE_CAP);
        assert_eq!(data.text_length, 2000);

        let activity = Activity::new(ActivityPayload::website_visit("u", &long, 3), ts());
        let ActivityPayload::WebsiteVisit(data) = &activity.payload else {
            panic!("expected visit payload");
        };
        assert_eq!(data.title.chars().count(), TITLE_CAP);

        let activity = Activity::new(ActivityPayload::editor_copied(&long), ts());
        let ActivityPayload::TextEditorCopied(data) = &activity.payload else {
            panic!("expected editor copy payload");
        };
        assert_eq!(data.text.chars().count(), TEXT_CAP);
        assert_eq!(data.text_length, 2000);

        let estimate = crate::attribution::SourceEstimate::unknown();
        let activity = Activity::new(ActivityPayload::editor_pasted(&long, &estimate), ts());
        let ActivityPayload::TextEditorPasted(data) = &activity.payload else {
            panic!("expected paste payload");
        };
        assert_eq!(data.text.chars().count(), TEXT_CAP);
        assert_eq!(data.text_length, 2000);
    }

    #[test]
    fn serializes_with_type_and_data_fields() {
        let activity = Activity {
            id: ActivityId::new("act_1_abc").unwrap(),
            timestamp: ts(),
            payload: ActivityPayload::search("rust ownership", None),
        };

        let json = serde_json::to_string(&activity).unwrap();
        insta::assert_snapshot!(json, @r#"{"id":"act_1_abc","type":"search","timestamp":"2025-01-29T12:00:00Z","data":{"query":"rust ownership"}}"#);
    }

    #[test]
    fn serde_roundtrip_preserves_payload() {
        let activity = Activity::new(
            ActivityPayload::tab_switched(Some(Surface::Search), Surface::Editor),
            ts(),
        );

        let json = serde_json::to_string(&activity).unwrap();
        let parsed: Activity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, activity);
    }

    #[test]
    fn legacy_prompt_type_deserializes() {
        let json = r#"{
            "id": "act_1_abc",
            "type": "chatgpt_prompt",
            "timestamp": "2025-01-29T12:00:00Z",
            "data": {"prompt": "p", "response": "r", "model": "GPT-4", "prompt_length": 1, "response_length": 1}
        }"#;
        let parsed: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.activity_type(), ActivityType::PromptSubmitted);
    }

    #[test]
    fn mismatched_payload_is_rejected() {
        let json = r#"{
            "id": "act_1_abc",
            "type": "search",
            "timestamp": "2025-01-29T12:00:00Z",
            "data": {"url": "https://example.com"}
        }"#;
        let result: Result<Activity, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn summary_shortens_long_text() {
        let activity = Activity::new(ActivityPayload::editor_copied(&"a".repeat(80)), ts());
        assert_eq!(activity.summary(), format!("{}...", "a".repeat(50)));
    }
}
