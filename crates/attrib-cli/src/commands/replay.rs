//! Replay command: drives the engine from a stream of observed events.
//!
//! Each input line is a JSON [`TimedEvent`]. Events are applied in file
//! order; pending autosaves fire when the next event (or the end of input)
//! is past their deadline.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use attrib_core::{
    ActionEntry, AttributionEngine, EngineConfig, KeyValueStore, Reaction, TimedEvent,
};
use attrib_db::ActionLog;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counts produced by a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub activities: usize,
    pub paragraphs: usize,
    pub actions: usize,
}

/// Appends `entry`, dropping it with a warning when the log is unwritable.
fn write_action(actions: &ActionLog, entry: &ActionEntry, summary: &mut ReplaySummary) {
    match actions.append(entry) {
        Ok(()) => summary.actions += 1,
        Err(err) => tracing::warn!(error = %err, action = %entry.action, "dropping action"),
    }
}

/// Applies every event in `reader` to `engine`.
///
/// Returns the summary and the time of the last event.
pub fn replay<S, R>(
    engine: &mut AttributionEngine<S>,
    reader: R,
    actions: &ActionLog,
    config: &EngineConfig,
) -> Result<(ReplaySummary, Option<DateTime<Utc>>)>
where
    S: KeyValueStore,
    R: BufRead,
{
    let mut summary = ReplaySummary::default();
    let mut last_at = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("failed to read event")?;
        if line.trim().is_empty() {
            continue;
        }
        let timed: TimedEvent = serde_json::from_str(&line)
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        let now = timed.at.unwrap_or_else(Utc::now);

        if let Some(saved) = engine.tick(now) {
            write_action(actions, &saved, &mut summary);
        }

        let Reaction {
            activity,
            paragraph,
            action,
        } = engine.observe(timed.event, now);

        summary.events += 1;
        summary.activities += usize::from(activity.is_some());
        summary.paragraphs += usize::from(paragraph.is_some());
        if let Some(entry) = action {
            write_action(actions, &entry, &mut summary);
        }
        last_at = Some(now);
    }

    // Input is exhausted; let the pending autosave run
    if let Some(saved) = last_at.and_then(|last| engine.tick(last + config.autosave_delay)) {
        write_action(actions, &saved, &mut summary);
    }

    tracing::info!(
        events = summary.events,
        activities = summary.activities,
        paragraphs = summary.paragraphs,
        "replay finished"
    );

    Ok((summary, last_at))
}

pub fn format_summary(summary: &ReplaySummary) -> String {
    format!(
        "Replayed {} events: {} activities, {} paragraphs, {} actions logged\n",
        summary.events, summary.activities, summary.paragraphs, summary.actions
    )
}

/// Runs the replay command.
pub fn run<S, W>(
    writer: &mut W,
    engine: &mut AttributionEngine<S>,
    actions: &ActionLog,
    config: &EngineConfig,
    file: Option<&Path>,
    debug: bool,
) -> Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    let (summary, last_at) = match file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            replay(engine, BufReader::new(file), actions, config)?
        }
        None => replay(engine, io::stdin().lock(), actions, config)?,
    };

    write!(writer, "{}", format_summary(&summary))?;

    if debug {
        let snapshot = engine.debug_snapshot(last_at.unwrap_or_else(Utc::now));
        let json = serde_json::to_string_pretty(&snapshot)
            .context("failed to serialize debug snapshot")?;
        writeln!(writer, "{json}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use attrib_core::{ActivityType, MemoryStore};
    use insta::assert_snapshot;

    const SESSION: &str = r#"
{"at":"2025-01-29T12:00:00Z","kind":"surface_focused","surface":"chat"}
{"at":"2025-01-29T12:00:05Z","kind":"prompt_submitted","prompt":"What is a lifetime?","response":"A region of code."}
{"at":"2025-01-29T12:00:20Z","kind":"surface_focused","surface":"editor"}
{"at":"2025-01-29T12:00:22Z","kind":"editor_pasted","text":"A region of code."}
{"at":"2025-01-29T12:00:30Z","kind":"editor_input","content":"Lifetimes describe regions"}
{"at":"2025-01-29T12:00:31Z","kind":"editor_input","content":"Lifetimes describe regions\n\n"}
"#;

    fn engine() -> AttributionEngine<MemoryStore> {
        AttributionEngine::load(MemoryStore::new(), &EngineConfig::default())
    }

    #[test]
    fn replay_drives_engine_and_logs_actions() {
        let temp = tempfile::tempdir().unwrap();
        let actions = ActionLog::new(temp.path().join("actions.jsonl"));
        let mut engine = engine();

        let (summary, last_at) =
            replay(&mut engine, SESSION.as_bytes(), &actions, &EngineConfig::default()).unwrap();

        // focus x2, prompt, paste
        assert_eq!(summary.activities, 4);
        assert_eq!(summary.paragraphs, 1);
        assert_eq!(summary.events, 6);
        assert_eq!(
            last_at,
            Some("2025-01-29T12:00:31Z".parse::<DateTime<Utc>>().unwrap())
        );

        let logged: Vec<_> = actions
            .read_all()
            .unwrap()
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        assert_eq!(
            logged,
            vec!["tab_switched", "tab_switched", "text_pasted", "text_saved"]
        );
        assert_eq!(summary.actions, 4);

        let paste = engine
            .activities()
            .all()
            .iter()
            .find(|a| a.activity_type() == ActivityType::TextEditorPasted)
            .unwrap();
        assert_eq!(paste.paste().unwrap().estimated_source, "chat");

        let paragraph = &engine.paragraphs().all()[0];
        assert_eq!(paragraph.content, "Lifetimes describe regions");
        assert_eq!(paragraph.sources.len(), 4);
    }

    #[test]
    fn malformed_line_is_reported_with_line_number() {
        let temp = tempfile::tempdir().unwrap();
        let actions = ActionLog::new(temp.path().join("actions.jsonl"));
        let input = "{\"kind\":\"editor_saved\"}\n{\"kind\":\"teleported\"}\n";

        let err = replay(&mut engine(), input.as_bytes(), &actions, &EngineConfig::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn unwritable_action_log_is_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let actions = ActionLog::new(blocker.join("actions.jsonl"));
        let input = r#"{"at":"2025-01-29T12:00:00Z","kind":"surface_focused","surface":"search"}"#;

        let mut engine = engine();
        let (summary, _) =
            replay(&mut engine, input.as_bytes(), &actions, &EngineConfig::default()).unwrap();

        assert_eq!(summary.actions, 0);
        assert_eq!(summary.activities, 1);
    }

    #[test]
    fn summary_format() {
        let summary = ReplaySummary {
            events: 6,
            activities: 4,
            paragraphs: 1,
            actions: 4,
        };
        assert_snapshot!(
            format_summary(&summary),
            @"Replayed 6 events: 4 activities, 1 paragraphs, 4 actions logged"
        );
    }
}
