//! Stats command for attribution totals.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use attrib_core::Statistics;

pub fn format_statistics(stats: &Statistics) -> String {
    let mut output = String::new();
    writeln!(output, "Paragraphs: {}", stats.total_paragraphs).unwrap();
    writeln!(output, "Activities: {}", stats.total_activities).unwrap();
    writeln!(output, "Words: {}", stats.total_words).unwrap();
    writeln!(output, "Characters: {}", stats.total_characters).unwrap();
    writeln!(
        output,
        "Average words per paragraph: {}",
        stats.average_words_per_paragraph
    )
    .unwrap();

    if !stats.source_types.is_empty() {
        writeln!(output, "Activity types:").unwrap();
        for (activity_type, count) in &stats.source_types {
            writeln!(output, "  {activity_type}: {count}").unwrap();
        }
    }

    output
}

pub fn run<W: Write>(writer: &mut W, stats: &Statistics, json: bool) -> Result<()> {
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(stats)?)?;
    } else {
        write!(writer, "{}", format_statistics(stats))?;
    }
    Ok(())
}
