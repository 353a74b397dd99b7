//! Append-only JSONL log of UI actions.
//!
//! Writers take an exclusive `fs2` lock on a sidecar lock file so concurrent
//! processes never interleave partial lines.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use attrib_core::ActionEntry;
use fs2::FileExt;

use crate::DbError;

/// Handle to an action log file.
#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn io_error(&self, source: std::io::Error) -> DbError {
        DbError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Appends one entry as a JSON line, creating the file and its parent
    /// directory if needed.
    pub fn append(&self, entry: &ActionEntry) -> Result<(), DbError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let lock_file = File::create(self.lock_path()).map_err(|e| self.io_error(e))?;
        lock_file.lock_exclusive().map_err(|e| self.io_error(e))?;

        let json = serde_json::to_string(entry).map_err(DbError::Encode)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{json}").map_err(|e| self.io_error(e))?;

        tracing::trace!(action = %entry.action, source = %entry.source, "appended action");
        Ok(())
    }

    /// Reads every entry in file order. A missing file reads as empty.
    ///
    /// Blank lines are skipped; any other malformed line is an error.
    pub fn read_all(&self) -> Result<Vec<ActionEntry>, DbError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut entries = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|source| DbError::InvalidEntry {
                line: idx + 1,
                source,
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> Result<Vec<ActionEntry>, DbError> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(n);
        Ok(entries.split_off(start))
    }

    /// Deletes the log file under the writer lock. A missing file is not an
    /// error.
    pub fn clear(&self) -> Result<(), DbError> {
        if self.path.parent().is_some_and(|parent| !parent.exists()) {
            return Ok(());
        }

        let lock_file = File::create(self.lock_path()).map_err(|e| self.io_error(e))?;
        lock_file.lock_exclusive().map_err(|e| self.io_error(e))?;

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}
