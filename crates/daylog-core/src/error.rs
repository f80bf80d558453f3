//! Core error types for daylog-core.
//!
//! Validation failures are surfaced to the caller for user-facing
//! messaging; storage conflicts are retried by the engines; foreign
//! data in the store is skipped rather than treated as an error.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for daylog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Entry validation failures (empty, over-length, day full)
    #[error("Entry rejected: {0}")]
    Entry(#[from] EntryError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A version-checked write lost the race for its key
    #[error("Version conflict writing key '{key}'")]
    Conflict { key: String },

    /// Stored value is not valid JSON
    #[error("Stored value for key '{key}' is not valid JSON")]
    Corrupt { key: String },

    /// IO errors (data directory creation and the like)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry validation failures.
///
/// These correspond to conditions the UI reports back to the user, so
/// each message is self-contained.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// Text is empty after trimming
    #[error("entry text is empty")]
    Empty,

    /// Text exceeds the per-entry character limit
    #[error("entry text is {len} characters; the limit is {max}")]
    TooLong { len: usize, max: usize },

    /// The day already holds the maximum number of entries
    #[error("day already has the maximum of {max} entries")]
    DayFull { max: usize },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
