//! Persistent key-value storage.
//!
//! All durable state lives in a single string-keyed store of JSON
//! values: one key per day with entries, plus the `streak` and
//! `settings` singletons. The store is the only owner of durable state;
//! everything held in memory is a transient view re-read from here.
//!
//! Writes are version-checked so that two access contexts without
//! shared memory (the interactive session and the scheduling context)
//! can both mutate a key without silently overwriting each other.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde_json::Value;
use std::path::PathBuf;

use crate::error::StorageError;

/// Key of the streak singleton.
pub const STREAK_KEY: &str = "streak";
/// Key of the settings singleton.
pub const SETTINGS_KEY: &str = "settings";

/// Attempts a read-modify-write loop makes before giving up on a
/// contended key.
pub(crate) const CAS_RETRY_LIMIT: usize = 8;

/// A stored value together with its write version.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    pub value: Value,
    pub version: u64,
}

/// Narrow durable key-value surface.
///
/// Every write replaces the complete value for its key; readers never
/// observe a partial record. An absent key has version `0`, so
/// `put(key, value, Some(0))` is "create only if still absent".
pub trait KvStore: Send + Sync {
    /// Read a key. Absent keys yield `None`; a stored value that is not
    /// valid JSON yields [`StorageError::Corrupt`].
    fn get(&self, key: &str) -> Result<Option<Versioned>, StorageError>;

    /// Replace `key` with `value`, returning the new version.
    ///
    /// With `expected = Some(v)` the write succeeds only when the stored
    /// version is exactly `v`, failing with [`StorageError::Conflict`]
    /// otherwise. `expected = None` replaces unconditionally
    /// (last write wins).
    fn put(&self, key: &str, value: &Value, expected: Option<u64>) -> Result<u64, StorageError>;

    /// Remove `keys` in one batch. Missing keys are ignored.
    fn remove_many(&self, keys: &[String]) -> Result<(), StorageError>;

    /// All keys currently present.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Returns `~/.config/daylog[-dev]/` based on DAYLOG_ENV.
///
/// Set DAYLOG_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DAYLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("daylog-dev")
    } else {
        base_dir.join("daylog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
