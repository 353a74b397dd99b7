//! Storage layer for the attribution engine.
//!
//! Provides a persistent [`KeyValueStore`] backed by `rusqlite` and the
//! append-only JSONL action log.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! A single `kv` table holds whole JSON documents keyed by name. The engine
//! rewrites a document in full on every mutation, so there is no per-row
//! history and no migration story beyond the document format itself.
//!
//! Timestamps in `updated_at` are stored as TEXT in RFC 3339 format with
//! millisecond precision (e.g., `2024-01-15T10:30:00.000Z`).

mod action_log;

use std::path::{Path, PathBuf};

use attrib_core::storage::{KeyValueStore, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use thiserror::Error;

pub use action_log::ActionLog;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to read or write the action log.
    #[error("action log I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A line in the action log is not a valid entry.
    #[error("invalid action log entry on line {line}: {source}")]
    InvalidEntry {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// An entry could not be encoded.
    #[error("failed to encode action log entry: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Metadata for one stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub key: String,
    /// Length of the stored JSON in characters.
    pub size: usize,
    pub updated_at: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Returns the document stored under `key`.
    pub fn get_document(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Inserts or replaces the document under `key`.
    pub fn put_document(
        &self,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, value, format_timestamp(now)],
        )?;
        Ok(())
    }

    /// Deletes the document under `key`. Missing keys are not an error.
    pub fn delete_document(&self, key: &str) -> Result<bool, DbError> {
        let deleted = self.conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        Ok(deleted > 0)
    }

    /// Lists every stored document, ordered by key.
    pub fn documents(&self) -> Result<Vec<DocumentInfo>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, length(value), updated_at FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            let size: i64 = row.get(1)?;
            Ok(DocumentInfo {
                key: row.get(0)?,
                size: usize::try_from(size).unwrap_or(0),
                updated_at: row.get(2)?,
            })
        })?;
        let documents = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.get_document(key).map_err(StoreError::backend)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.put_document(key, value, Utc::now())
            .map_err(StoreError::backend)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.delete_document(key)
            .map(|_| ())
            .map_err(StoreError::backend)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
