//! Clear command.

use std::io::Write;

use anyhow::Result;
use attrib_core::{AttributionEngine, KeyValueStore};

pub fn run<S: KeyValueStore, W: Write>(
    writer: &mut W,
    engine: &mut AttributionEngine<S>,
) -> Result<()> {
    let activities = engine.activities().len();
    let paragraphs = engine.paragraphs().len();

    engine.clear();

    writeln!(
        writer,
        "Cleared {activities} activities and {paragraphs} paragraphs."
    )?;
    Ok(())
}
