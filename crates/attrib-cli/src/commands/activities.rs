//! Activities and paragraphs dump commands.

use std::io::Write;

use anyhow::Result;
use attrib_core::{ActivityLog, ParagraphLog};
use chrono::{DateTime, Utc};

/// Writes activities at or after `since` as JSON lines.
pub fn run<W: Write>(
    writer: &mut W,
    activities: &ActivityLog,
    since: Option<DateTime<Utc>>,
) -> Result<()> {
    let selected = activities
        .all()
        .iter()
        .filter(|activity| since.is_none_or(|since| activity.timestamp >= since));

    for activity in selected {
        writeln!(writer, "{}", serde_json::to_string(activity)?)?;
    }
    Ok(())
}

/// Writes every finalized paragraph as JSON lines.
pub fn run_paragraphs<W: Write>(writer: &mut W, paragraphs: &ParagraphLog) -> Result<()> {
    for paragraph in paragraphs.all() {
        writeln!(writer, "{}", serde_json::to_string(paragraph)?)?;
    }
    Ok(())
}
