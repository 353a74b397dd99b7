//! Key-value persistence seam.
//!
//! The engine persists whole JSON documents under fixed keys and never blocks
//! on the outcome: failures are logged and the in-memory state stays
//! authoritative for the rest of the process.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key holding the serialized activity log.
pub const ACTIVITIES_KEY: &str = "attribution_activities";
/// Key holding the serialized paragraph log.
pub const PARAGRAPHS_KEY: &str = "attribution_paragraphs";
/// Key holding the editor's autosaved text.
pub const SAVED_TEXT_KEY: &str = "saved_text";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The value could not be encoded or decoded.
    #[error("invalid stored document under {key}: {source}")]
    Document {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Wraps any backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// A string-keyed document store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store, used for ephemeral sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Serializes `value` and writes it under `key`.
pub fn save_document<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|source| StoreError::Document {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// Reads and parses the document under `key`, or `None` when absent.
pub fn load_document<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(json) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| StoreError::Document {
            key: key.to_string(),
            source,
        })
}

/// Like [`save_document`], but logs and swallows failures.
pub fn persist_or_log<S, T>(store: &mut S, key: &str, value: &T)
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    if let Err(err) = save_document(store, key, value) {
        tracing::error!(key, error = %err, "failed to persist state");
    }
}

/// Loads a collection, falling back to an empty one on absence or failure.
pub fn load_or_default<S, T>(store: &S, key: &str) -> T
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    match load_document(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding unreadable persisted state");
            T::default()
        }
    }
}

/// Removes `key`, logging failures.
pub fn remove_or_log<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) {
    if let Err(err) = store.remove(key) {
        tracing::error!(key, error = %err, "failed to erase persisted state");
    }
}
