//! SQLite-backed key-value store.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::{data_dir, KvStore, Versioned};
use crate::error::StorageError;

/// SQLite store at `~/.config/daylog/daylog.db`.
///
/// One row per key. Version-checked updates run as a single conditional
/// UPDATE, so the check-and-write is atomic even across processes
/// sharing the database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at the default location, creating file and schema
    /// as needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("daylog.db");
        Self::open_at(path)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: PathBuf) -> Result<Self, StorageError> {
        let conn =
            Connection::open(&path).map_err(|source| StorageError::OpenFailed { path, source })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests and throwaway sessions).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1
            );",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::QueryFailed("store connection lock poisoned".into()))
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Versioned>, StorageError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT value, version FROM kv WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((raw, version)) => {
                let value = serde_json::from_str(&raw).map_err(|_| StorageError::Corrupt {
                    key: key.to_string(),
                })?;
                Ok(Some(Versioned { value, version }))
            }
        }
    }

    fn put(&self, key: &str, value: &Value, expected: Option<u64>) -> Result<u64, StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        let conn = self.lock()?;

        match expected {
            None => {
                let next: u64 = conn.query_row(
                    "SELECT COALESCE((SELECT version FROM kv WHERE key = ?1), 0) + 1",
                    params![key],
                    |row| row.get(0),
                )?;
                conn.execute(
                    "INSERT OR REPLACE INTO kv (key, value, version) VALUES (?1, ?2, ?3)",
                    params![key, raw, next],
                )?;
                Ok(next)
            }
            Some(0) => {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO kv (key, value, version) VALUES (?1, ?2, 1)",
                    params![key, raw],
                )?;
                if inserted == 0 {
                    return Err(StorageError::Conflict {
                        key: key.to_string(),
                    });
                }
                Ok(1)
            }
            Some(version) => {
                let updated = conn.execute(
                    "UPDATE kv SET value = ?2, version = ?3 WHERE key = ?1 AND version = ?4",
                    params![key, raw, version + 1, version],
                )?;
                if updated == 0 {
                    return Err(StorageError::Conflict {
                        key: key.to_string(),
                    });
                }
                Ok(version + 1)
            }
        }
    }

    fn remove_many(&self, keys: &[String]) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }
        let conn = self.lock()?;
        let mut stmt = conn.prepare("DELETE FROM kv WHERE key = ?1")?;
        for key in keys {
            stmt.execute(params![key])?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }
}
