//! Paragraph segmentation.
//!
//! The segmenter holds at most one open paragraph. Every editor update
//! rewrites its content and counts; finalizing stamps the end time and the
//! attributed sources and hands the record over to the [`ParagraphLog`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ActivityId, ParagraphId};

/// A unit of authored text and the activities it is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: ParagraphId,
    pub content: String,
    pub start_time: DateTime<Utc>,
    /// `None` while the paragraph is open.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub word_count: usize,
    pub character_count: usize,
    /// Empty while open; fixed once finalized.
    #[serde(default)]
    pub sources: Vec<ActivityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

impl Paragraph {
    fn open(content: &str, now: DateTime<Utc>) -> Self {
        let mut paragraph = Self {
            id: ParagraphId::generate(now),
            content: String::new(),
            start_time: now,
            end_time: None,
            word_count: 0,
            character_count: 0,
            sources: Vec::new(),
            duration_minutes: None,
        };
        paragraph.set_content(content);
        paragraph
    }

    fn set_content(&mut self, content: &str) {
        content.clone_into(&mut self.content);
        self.word_count = count_words(content);
        self.character_count = content.chars().count();
    }

    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// First `cap` characters of the content, for previews.
    pub fn preview(&self, cap: usize) -> String {
        crate::activity::ellipsize(&self.content, cap)
    }
}

/// Number of whitespace-delimited tokens; zero for blank text.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True when the last two lines of `content` are both empty, i.e. the text
/// ends in two consecutive newlines.
pub fn is_paragraph_boundary(content: &str) -> bool {
    let lines: Vec<&str> = content.split('\n').collect();
    lines.len() > 1 && lines[lines.len() - 1].is_empty() && lines[lines.len() - 2].is_empty()
}

/// `round((end - start) / 1 minute)`, halves rounding up.
fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    (ms + 30_000).div_euclid(60_000)
}

/// Tracks the single in-progress paragraph.
#[derive(Debug, Clone, Default)]
pub struct ParagraphSegmenter {
    current: Option<Paragraph>,
}

impl ParagraphSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a paragraph with `initial` content.
    ///
    /// An already-open paragraph is kept as is and returned; it is never
    /// replaced.
    pub fn start(&mut self, initial: &str, now: DateTime<Utc>) -> &Paragraph {
        self.current.get_or_insert_with(|| {
            let paragraph = Paragraph::open(initial, now);
            tracing::debug!(paragraph_id = %paragraph.id, "paragraph started");
            paragraph
        })
    }

    /// Replaces the open paragraph's content, opening one if none is open.
    pub fn update(&mut self, content: &str, now: DateTime<Utc>) -> &Paragraph {
        if let Some(paragraph) = &mut self.current {
            paragraph.set_content(content);
        }
        self.start(content, now)
    }

    /// Closes the open paragraph with the given sources.
    ///
    /// Returns `None` when nothing is open.
    pub fn finish(&mut self, sources: Vec<ActivityId>, now: DateTime<Utc>) -> Option<Paragraph> {
        let mut paragraph = self.current.take()?;
        paragraph.end_time = Some(now);
        paragraph.sources = sources;
        paragraph.duration_minutes = Some(duration_minutes(paragraph.start_time, now));
        Some(paragraph)
    }

    pub const fn current(&self) -> Option<&Paragraph> {
        self.current.as_ref()
    }

    /// Drops the open paragraph without finalizing it.
    pub fn discard(&mut self) {
        self.current = None;
    }
}

/// Finalized paragraphs in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParagraphLog {
    paragraphs: Vec<Paragraph>,
}

impl ParagraphLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    pub fn get(&self, id: &ParagraphId) -> Option<&Paragraph> {
        self.paragraphs.iter().find(|p| &p.id == id)
    }

    pub fn all(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// The last `n` paragraphs, oldest first.
    pub fn tail(&self, n: usize) -> &[Paragraph] {
        let start = self.paragraphs.len().saturating_sub(n);
        &self.paragraphs[start..]
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn clear(&mut self) {
        self.paragraphs.clear();
    }
}
