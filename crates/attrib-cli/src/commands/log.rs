//! Log command for recent UI actions.

use std::io::Write;

use anyhow::{Context, Result};
use attrib_core::ActionEntry;
use attrib_db::ActionLog;

pub fn format_entry(entry: &ActionEntry) -> String {
    format!(
        "{} [{}] {}: {}",
        entry.local_time, entry.source, entry.action, entry.content
    )
}

pub fn run<W: Write>(writer: &mut W, actions: &ActionLog, limit: usize) -> Result<()> {
    let entries = actions
        .tail(limit)
        .with_context(|| format!("failed to read {}", actions.path().display()))?;

    if entries.is_empty() {
        writeln!(writer, "No actions logged.")?;
        return Ok(());
    }

    for entry in &entries {
        writeln!(writer, "{}", format_entry(entry))?;
    }
    Ok(())
}
