//! Status command for showing storage locations and counts.

use std::io::Write;

use anyhow::Result;
use attrib_core::{AttributionEngine, KeyValueStore};
use attrib_db::DocumentInfo;

use crate::Config;

pub fn run<S: KeyValueStore, W: Write>(
    writer: &mut W,
    config: &Config,
    engine: &AttributionEngine<S>,
    documents: &[DocumentInfo],
) -> Result<()> {
    writeln!(writer, "Attribution status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Action log: {}", config.action_log_path.display())?;
    writeln!(
        writer,
        "Tracking: {}",
        if engine.is_tracking() { "enabled" } else { "disabled" }
    )?;
    writeln!(writer, "Activities: {}", engine.activities().len())?;
    writeln!(writer, "Paragraphs: {}", engine.paragraphs().len())?;

    if documents.is_empty() {
        writeln!(writer, "No stored documents.")?;
        return Ok(());
    }

    writeln!(writer, "Documents:")?;
    for doc in documents {
        writeln!(writer, "- {}: {} chars, updated {}", doc.key, doc.size, doc.updated_at)?;
    }

    Ok(())
}
