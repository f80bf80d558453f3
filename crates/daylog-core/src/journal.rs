//! Session facade over storage, streaks, retention, and settings.
//!
//! A `Journal` is one access context's view of the store. Opening it
//! seeds missing singletons and runs the retention sweep; every read
//! goes back to the store, so nothing authoritative lives only in this
//! process.

use log::warn;
use std::sync::Arc;

use crate::clock::Clock;
use crate::day::{DayKey, DayRecord};
use crate::entries::EntryStore;
use crate::error::{Result, StorageError, ValidationError};
use crate::reminder::{load_settings, Settings};
use crate::retention::RetentionPolicy;
use crate::storage::{KvStore, SETTINGS_KEY, STREAK_KEY};
use crate::streak::{StreakState, StreakTracker};

pub struct Journal {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    entries: EntryStore,
    streak: StreakTracker,
    retention: RetentionPolicy,
}

impl Journal {
    /// Open a session: seed missing singletons with their defaults and
    /// run the retention sweep.
    ///
    /// A failed sweep is logged and deferred to the next open rather
    /// than blocking the session.
    pub fn open(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let journal = Self {
            entries: EntryStore::new(Arc::clone(&store)),
            streak: StreakTracker::new(Arc::clone(&store)),
            retention: RetentionPolicy::new(Arc::clone(&store)),
            store,
            clock,
        };
        journal.ensure_defaults()?;
        if let Err(err) = journal.retention.sweep(journal.clock.today()) {
            warn!("retention sweep failed; will retry next open: {err}");
        }
        Ok(journal)
    }

    /// First-run initialization of the `streak` and `settings`
    /// singletons. Losing the creation race to another context is fine;
    /// whatever landed first wins.
    fn ensure_defaults(&self) -> Result<()> {
        self.seed(STREAK_KEY, serde_json::to_value(StreakState::default())?)?;
        self.seed(SETTINGS_KEY, serde_json::to_value(Settings::default())?)?;
        Ok(())
    }

    fn seed(&self, key: &str, value: serde_json::Value) -> Result<()> {
        match self.store.get(key) {
            Ok(Some(_)) => Ok(()),
            Err(StorageError::Corrupt { .. }) => Ok(()), // readers fall back to defaults
            Ok(None) => match self.store.put(key, &value, Some(0)) {
                Ok(_) | Err(StorageError::Conflict { .. }) => Ok(()),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    pub fn today(&self) -> DayKey {
        self.clock.today()
    }

    /// Today's record, freshly read from the store.
    pub fn today_entries(&self) -> Result<DayRecord> {
        self.entries.load(self.today())
    }

    pub fn entries(&self, day: DayKey) -> Result<DayRecord> {
        self.entries.load(day)
    }

    /// Add an entry for today, then advance the streak.
    ///
    /// The streak moves only on this path -- a successful add -- never
    /// on reads, so a zero-entry day cannot touch it.
    pub fn add_entry(&self, text: &str) -> Result<DayRecord> {
        let today = self.today();
        let record = self.entries.add(today, text)?;
        self.streak.record_activity(today)?;
        Ok(record)
    }

    pub fn remove_entry(&self, day: DayKey, index: usize) -> Result<DayRecord> {
        self.entries.remove_at(day, index)
    }

    pub fn streak(&self) -> Result<StreakState> {
        self.streak.state()
    }

    pub fn settings(&self) -> Result<Settings> {
        load_settings(self.store.as_ref())
    }

    /// Persist new settings.
    ///
    /// Returns `true` when the reminder hour changed, in which case the
    /// holder of the alarm handle must reinstall the daily alarm for
    /// the change to take effect.
    pub fn update_settings(&self, settings: Settings) -> Result<bool> {
        if settings.reminder_hour > 23 {
            return Err(ValidationError::InvalidValue {
                field: "reminderHour".to_string(),
                message: format!("{} is not an hour (0-23)", settings.reminder_hour),
            }
            .into());
        }
        let previous = self.settings()?;
        let value = serde_json::to_value(&settings)?;
        self.store.put(SETTINGS_KEY, &value, None)?;
        Ok(settings.reminder_hour != previous.reminder_hour)
    }

    /// Run the retention sweep now; returns the removed day keys.
    pub fn sweep(&self) -> Result<Vec<DayKey>> {
        self.retention.sweep(self.today())
    }
}
