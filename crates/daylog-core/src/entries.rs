//! Per-day entry storage with size limits.
//!
//! Every mutation is a read-modify-write of the full day record against
//! the store, version-checked and retried on conflict, so two access
//! contexts appending to the same day cannot silently drop each other's
//! writes.

use log::warn;
use std::sync::Arc;

use crate::day::{DayKey, DayRecord, MAX_CHARS, MAX_ENTRIES_PER_DAY};
use crate::error::{EntryError, Result, StorageError, ValidationError};
use crate::storage::{KvStore, CAS_RETRY_LIMIT};

/// Manages the ordered entry list for each day key.
pub struct EntryStore {
    store: Arc<dyn KvStore>,
}

impl EntryStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Read the record for `day`. An absent key is an empty record, not
    /// an error.
    pub fn load(&self, day: DayKey) -> Result<DayRecord> {
        let (record, _) = self.load_versioned(day)?;
        Ok(record)
    }

    /// Append a trimmed entry to `day`.
    ///
    /// Rejects empty input, input over [`MAX_CHARS`] characters, and a
    /// day that already holds [`MAX_ENTRIES_PER_DAY`] entries. On
    /// success the full updated record is persisted and returned.
    pub fn add(&self, day: DayKey, text: &str) -> Result<DayRecord> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EntryError::Empty.into());
        }
        let len = trimmed.chars().count();
        if len > MAX_CHARS {
            return Err(EntryError::TooLong {
                len,
                max: MAX_CHARS,
            }
            .into());
        }

        let entry = trimmed.to_string();
        self.mutate(day, move |record| {
            if record.len() >= MAX_ENTRIES_PER_DAY {
                return Err(EntryError::DayFull {
                    max: MAX_ENTRIES_PER_DAY,
                }
                .into());
            }
            record.push(entry.clone());
            Ok(())
        })
    }

    /// Remove the entry at `index`, persisting the shortened record.
    ///
    /// An invalid index is a usage error and fails loudly.
    pub fn remove_at(&self, day: DayKey, index: usize) -> Result<DayRecord> {
        self.mutate(day, move |record| {
            if index >= record.len() {
                return Err(ValidationError::OutOfBounds {
                    collection: format!("entries for {day}"),
                    index,
                    len: record.len(),
                }
                .into());
            }
            record.remove(index);
            Ok(())
        })
    }

    /// Read `day` together with the version to check the next write
    /// against. `None` means the stored value was unreadable and the
    /// next write replaces it wholesale.
    fn load_versioned(&self, day: DayKey) -> Result<(DayRecord, Option<u64>)> {
        match self.store.get(&day.to_string()) {
            Ok(Some(stored)) => match serde_json::from_value::<DayRecord>(stored.value) {
                Ok(record) => Ok((record, Some(stored.version))),
                Err(_) => {
                    warn!("record under {day} has an unexpected shape; treating as empty");
                    Ok((DayRecord::default(), Some(stored.version)))
                }
            },
            Ok(None) => Ok((DayRecord::default(), Some(0))),
            Err(StorageError::Corrupt { .. }) => {
                warn!("record under {day} is corrupt; it will be replaced on the next write");
                Ok((DayRecord::default(), None))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn mutate<F>(&self, day: DayKey, mut apply: F) -> Result<DayRecord>
    where
        F: FnMut(&mut DayRecord) -> Result<()>,
    {
        for _ in 0..CAS_RETRY_LIMIT {
            let (mut record, version) = self.load_versioned(day)?;
            apply(&mut record)?;
            let value = serde_json::to_value(&record)?;
            match self.store.put(&day.to_string(), &value, version) {
                Ok(_) => return Ok(record),
                Err(StorageError::Conflict { .. }) => {
                    warn!("concurrent write to {day}; retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StorageError::Conflict {
            key: day.to_string(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;
    use serde_json::json;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn entry_store() -> (Arc<MemoryStore>, EntryStore) {
        let store = Arc::new(MemoryStore::new());
        let entries = EntryStore::new(store.clone() as Arc<dyn KvStore>);
        (store, entries)
    }

    #[test]
    fn absent_day_loads_empty() {
        let (_, entries) = entry_store();
        assert!(entries.load(day("2024-01-01")).unwrap().is_empty());
    }

    #[test]
    fn add_trims_and_persists() {
        let (store, entries) = entry_store();
        let record = entries.add(day("2024-01-01"), "  learned rust  ").unwrap();
        assert_eq!(record.entries(), ["learned rust"]);

        let stored = store.get("2024-01-01").unwrap().unwrap();
        assert_eq!(stored.value, json!(["learned rust"]));
    }

    #[test]
    fn add_rejects_blank_text() {
        let (_, entries) = entry_store();
        let err = entries.add(day("2024-01-01"), "   ").unwrap_err();
        assert!(matches!(err, CoreError::Entry(EntryError::Empty)));
    }

    #[test]
    fn add_rejects_over_length_text() {
        let (_, entries) = entry_store();
        let text = "x".repeat(MAX_CHARS + 1);
        let err = entries.add(day("2024-01-01"), &text).unwrap_err();
        assert!(matches!(err, CoreError::Entry(EntryError::TooLong { .. })));
    }

    #[test]
    fn add_accepts_exactly_max_chars() {
        let (_, entries) = entry_store();
        let text = "x".repeat(MAX_CHARS);
        assert_eq!(entries.add(day("2024-01-01"), &text).unwrap().len(), 1);
    }

    #[test]
    fn eleventh_entry_is_rejected_not_appended() {
        let (_, entries) = entry_store();
        let today = day("2024-01-01");
        for i in 0..MAX_ENTRIES_PER_DAY {
            entries.add(today, &format!("entry {i}")).unwrap();
        }

        let err = entries.add(today, "one too many").unwrap_err();
        assert!(matches!(err, CoreError::Entry(EntryError::DayFull { .. })));
        assert_eq!(entries.load(today).unwrap().len(), MAX_ENTRIES_PER_DAY);
    }

    #[test]
    fn remove_at_shifts_later_entries() {
        let (_, entries) = entry_store();
        let today = day("2024-01-01");
        entries.add(today, "a").unwrap();
        entries.add(today, "b").unwrap();
        entries.add(today, "c").unwrap();

        let record = entries.remove_at(today, 1).unwrap();
        assert_eq!(record.entries(), ["a", "c"]);
    }

    #[test]
    fn remove_at_rejects_invalid_index() {
        let (_, entries) = entry_store();
        let today = day("2024-01-01");
        entries.add(today, "only").unwrap();

        let err = entries.remove_at(today, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfBounds { index: 1, len: 1, .. })
        ));
    }

    #[test]
    fn removing_all_entries_keeps_the_key() {
        // An emptied day stays in the store; only the retention sweep
        // removes keys.
        let (store, entries) = entry_store();
        let today = day("2024-01-01");
        entries.add(today, "gone soon").unwrap();
        entries.remove_at(today, 0).unwrap();

        let stored = store.get("2024-01-01").unwrap().unwrap();
        assert_eq!(stored.value, json!([]));
    }

    #[test]
    fn two_handles_on_one_store_never_lose_writes() {
        // The documented race: both contexts append to the same day.
        // Each add re-reads before writing, so both entries land.
        let store = Arc::new(MemoryStore::new());
        let interactive = EntryStore::new(store.clone() as Arc<dyn KvStore>);
        let background = EntryStore::new(store.clone() as Arc<dyn KvStore>);
        let today = day("2024-01-01");

        interactive.add(today, "from the popup").unwrap();
        background.add(today, "from the worker").unwrap();

        let record = interactive.load(today).unwrap();
        assert_eq!(record.entries(), ["from the popup", "from the worker"]);
    }

    #[test]
    fn corrupt_record_reads_empty_and_is_replaced() {
        let (store, entries) = entry_store();
        let today = day("2024-01-01");
        // A record of the wrong shape (not an array of strings).
        store.put("2024-01-01", &json!({"bad": true}), None).unwrap();

        assert!(entries.load(today).unwrap().is_empty());
        let record = entries.add(today, "fresh start").unwrap();
        assert_eq!(record.entries(), ["fresh start"]);
    }

    proptest! {
        #[test]
        fn add_rejects_iff_trimmed_empty_or_over_limit(text in "\\PC*") {
            let (_, entries) = entry_store();
            let trimmed_len = text.trim().chars().count();
            let result = entries.add(day("2024-01-01"), &text);

            if trimmed_len == 0 {
                prop_assert!(matches!(result, Err(CoreError::Entry(EntryError::Empty))));
            } else if trimmed_len > MAX_CHARS {
                let is_too_long = matches!(result, Err(CoreError::Entry(EntryError::TooLong { .. })));
                prop_assert!(is_too_long);
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}
