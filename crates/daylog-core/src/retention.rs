//! Retention sweep for aged-out day partitions.

use log::info;
use std::sync::Arc;

use crate::day::{DayKey, MAX_DAYS_TO_KEEP};
use crate::error::Result;
use crate::storage::{KvStore, SETTINGS_KEY, STREAK_KEY};

/// Removes day partitions older than the retention window.
///
/// The singleton keys are always kept. Keys that do not parse as day
/// keys are foreign data and are never deleted. The sweep runs at
/// defined trigger points (session open, explicit command), not
/// continuously.
pub struct RetentionPolicy {
    store: Arc<dyn KvStore>,
    window_days: i64,
}

impl RetentionPolicy {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_window(store, MAX_DAYS_TO_KEEP)
    }

    pub fn with_window(store: Arc<dyn KvStore>, window_days: i64) -> Self {
        Self { store, window_days }
    }

    /// Sweep once, removing every day key strictly older than the
    /// window. Returns the removed keys in ascending order. Idempotent:
    /// a second sweep with no elapsed time removes nothing.
    pub fn sweep(&self, today: DayKey) -> Result<Vec<DayKey>> {
        let mut expired: Vec<DayKey> = Vec::new();

        for key in self.store.keys()? {
            if key == STREAK_KEY || key == SETTINGS_KEY {
                continue;
            }
            let Ok(day) = key.parse::<DayKey>() else {
                continue; // foreign key, not ours to delete
            };
            if today.days_since(day) > self.window_days {
                expired.push(day);
            }
        }

        if expired.is_empty() {
            return Ok(Vec::new());
        }

        expired.sort_unstable();
        let raw: Vec<String> = expired.iter().map(DayKey::to_string).collect();
        self.store.remove_many(&raw)?;
        info!("retention sweep removed {} day(s)", expired.len());
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for key in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"] {
            store.put(key, &json!(["old entry"]), None).unwrap();
        }
        store.put(STREAK_KEY, &json!({"count": 3, "lastUpdate": "2024-01-05"}), None).unwrap();
        store.put(SETTINGS_KEY, &json!({"reminderHour": 20, "notificationsEnabled": true}), None).unwrap();
        store.put("foo", &json!("foreign data"), None).unwrap();
        store
    }

    #[test]
    fn removes_aged_days_keeps_singletons_and_foreign_keys() {
        let store = seeded_store();
        let policy = RetentionPolicy::new(store.clone() as Arc<dyn KvStore>);

        let removed = policy.sweep(day("2024-02-20")).unwrap();
        assert_eq!(
            removed,
            vec![
                day("2024-01-01"),
                day("2024-01-02"),
                day("2024-01-03"),
                day("2024-01-04"),
                day("2024-01-05"),
            ]
        );

        let keys = store.keys().unwrap();
        assert_eq!(keys, vec!["foo", SETTINGS_KEY, STREAK_KEY]);
    }

    #[test]
    fn second_sweep_removes_nothing() {
        let store = seeded_store();
        let policy = RetentionPolicy::new(store as Arc<dyn KvStore>);
        let today = day("2024-02-20");

        assert_eq!(policy.sweep(today).unwrap().len(), 5);
        assert!(policy.sweep(today).unwrap().is_empty());
    }

    #[test]
    fn window_boundary_is_strictly_greater_than() {
        let store = Arc::new(MemoryStore::new());
        store.put("2024-01-01", &json!(["at the boundary"]), None).unwrap();
        store.put("2023-12-31", &json!(["past it"]), None).unwrap();
        let policy = RetentionPolicy::new(store.clone() as Arc<dyn KvStore>);

        // 2024-01-31 is exactly 30 days after 2024-01-01: kept.
        let removed = policy.sweep(day("2024-01-31")).unwrap();
        assert_eq!(removed, vec![day("2023-12-31")]);
        assert_eq!(store.keys().unwrap(), vec!["2024-01-01"]);
    }

    #[test]
    fn future_days_are_kept() {
        let store = Arc::new(MemoryStore::new());
        store.put("2024-06-01", &json!(["from a clock skew"]), None).unwrap();
        let policy = RetentionPolicy::new(store.clone() as Arc<dyn KvStore>);

        assert!(policy.sweep(day("2024-01-01")).unwrap().is_empty());
        assert_eq!(store.keys().unwrap().len(), 1);
    }
}
