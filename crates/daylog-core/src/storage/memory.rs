//! In-memory key-value store.
//!
//! Same versioning semantics as the SQLite store. Backs tests and
//! embedders that want a store without a database file.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{KvStore, Versioned};
use crate::error::StorageError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, (Value, u64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (Value, u64)>> {
        self.map
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Versioned>, StorageError> {
        let map = self.lock();
        Ok(map.get(key).map(|(value, version)| Versioned {
            value: value.clone(),
            version: *version,
        }))
    }

    fn put(&self, key: &str, value: &Value, expected: Option<u64>) -> Result<u64, StorageError> {
        let mut map = self.lock();
        let current = map.get(key).map(|(_, version)| *version).unwrap_or(0);

        if let Some(expected) = expected {
            if current != expected {
                return Err(StorageError::Conflict {
                    key: key.to_string(),
                });
            }
        }

        let next = current + 1;
        map.insert(key.to_string(), (value.clone(), next));
        Ok(next)
    }

    fn remove_many(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut map = self.lock();
        for key in keys {
            map.remove(key);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let map = self.lock();
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort_unstable();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn versions_count_up_per_key() {
        let store = MemoryStore::new();
        assert_eq!(store.put("k", &json!(1), Some(0)).unwrap(), 1);
        assert_eq!(store.put("k", &json!(2), Some(1)).unwrap(), 2);
        assert_eq!(store.put("other", &json!(1), Some(0)).unwrap(), 1);
    }

    #[test]
    fn stale_writer_gets_conflict() {
        let store = MemoryStore::new();
        store.put("k", &json!(["a"]), Some(0)).unwrap();
        store.put("k", &json!(["a", "b"]), Some(1)).unwrap();

        let err = store.put("k", &json!(["a", "c"]), Some(1));
        assert!(matches!(err, Err(StorageError::Conflict { .. })));
        assert_eq!(store.get("k").unwrap().unwrap().value, json!(["a", "b"]));
    }

    #[test]
    fn keys_come_back_sorted() {
        let store = MemoryStore::new();
        store.put("b", &json!(1), None).unwrap();
        store.put("a", &json!(1), None).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
