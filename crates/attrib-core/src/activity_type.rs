//! Activity type enum as the single source of truth for activity type strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical activity types recorded by the attribution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivityType {
    PromptSubmitted,
    Search,
    WebsiteVisit,
    TextCopied,
    TextEditorCopied,
    TextEditorPasted,
    TabSwitched,
}

impl ActivityType {
    /// All variants, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::PromptSubmitted,
        Self::Search,
        Self::WebsiteVisit,
        Self::TextCopied,
        Self::TextEditorCopied,
        Self::TextEditorPasted,
        Self::TabSwitched,
    ];

    /// String representation used in persisted state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PromptSubmitted => "prompt_submitted",
            Self::Search => "search",
            Self::WebsiteVisit => "website_visit",
            Self::TextCopied => "text_copied",
            Self::TextEditorCopied => "text_editor_copied",
            Self::TextEditorPasted => "text_editor_pasted",
            Self::TabSwitched => "tab_switched",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt_submitted" | "chatgpt_prompt" => Ok(Self::PromptSubmitted),
            "search" => Ok(Self::Search),
            "website_visit" => Ok(Self::WebsiteVisit),
            "text_copied" => Ok(Self::TextCopied),
            "text_editor_copied" => Ok(Self::TextEditorCopied),
            "text_editor_pasted" => Ok(Self::TextEditorPasted),
            "tab_switched" => Ok(Self::TabSwitched),
            _ => Err(UnknownActivityType(s.to_string())),
        }
    }
}

impl Serialize for ActivityType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown activity type strings.
#[derive(Debug, Clone)]
pub struct UnknownActivityType(String);

impl fmt::Display for UnknownActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown activity type: {}", self.0)
    }
}

impl std::error::Error for UnknownActivityType {}
