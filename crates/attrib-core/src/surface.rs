//! Embedded surfaces the user can focus.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// A surface of the desktop shell: one of the embedded browsing surfaces,
/// the text editor, or any other named pane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Surface {
    /// The AI chat assistant.
    Chat,
    /// The primary search engine.
    Search,
    /// The arbitrary-URL browsing surface.
    Custom,
    /// The text editor where writing happens.
    Editor,
    /// Any other named surface.
    Other(String),
}

impl Surface {
    /// String representation for persisted state and logs.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Chat => "chat",
            Self::Search => "search",
            Self::Custom => "custom",
            Self::Editor => "editor",
            Self::Other(name) => name,
        }
    }

    /// Per-source bias applied to paste confidence.
    ///
    /// Chat output is harder to copy cleanly, arbitrary pages vary widely,
    /// and unknown surfaces get the lowest trust.
    #[must_use]
    pub const fn source_multiplier(&self) -> f32 {
        match self {
            Self::Chat => 0.9,
            Self::Search => 1.0,
            Self::Custom => 0.8,
            Self::Editor | Self::Other(_) => 0.7,
        }
    }

    #[must_use]
    pub const fn is_editor(&self) -> bool {
        matches!(self, Self::Editor)
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Surface {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "surface" });
        }
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "chat" | "chatgpt" => Self::Chat,
            "search" | "google" => Self::Search,
            "custom" => Self::Custom,
            "editor" | "docs" => Self::Editor,
            _ => Self::Other(trimmed.to_string()),
        })
    }
}

impl Serialize for Surface {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Surface {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
