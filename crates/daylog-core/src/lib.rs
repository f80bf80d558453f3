//! # Daylog Core Library
//!
//! This library provides the core business logic for Daylog, a personal
//! daily-journaling tracker. It implements a CLI-first philosophy where
//! all operations are available via a standalone CLI binary, with any
//! graphical shell being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Entry engine**: per-day records with character and count caps,
//!   persisted whole on every mutation
//! - **Streak tracker**: consecutive-day counter that only moves when a
//!   day gains its first entry
//! - **Retention**: 30-day sweep over the key-value store
//! - **Reminders**: daily alarm anchor computation, fire-time
//!   suppression, and one-hour snooze
//! - **Storage**: version-checked key-value store over SQLite, so
//!   independent access contexts never silently overwrite each other
//!
//! ## Key Components
//!
//! - [`Journal`]: session facade over the engine
//! - [`EntryStore`]: per-day entry storage
//! - [`StreakTracker`]: streak state machine
//! - [`ReminderScheduler`]: alarm and notification decisions
//! - [`KvStore`]: durable storage boundary

pub mod clock;
pub mod day;
pub mod entries;
pub mod error;
pub mod journal;
pub mod logging;
pub mod reminder;
pub mod retention;
pub mod storage;
pub mod streak;

pub use clock::{Clock, FixedClock, SystemClock};
pub use day::{DayKey, DayRecord, MAX_CHARS, MAX_DAYS_TO_KEEP, MAX_ENTRIES_PER_DAY};
pub use entries::EntryStore;
pub use error::{CoreError, EntryError, StorageError, ValidationError};
pub use journal::Journal;
pub use reminder::{
    ActionOutcome, Alarm, AlarmScheduler, Notification, Notifier, ReminderAction,
    ReminderScheduler, Settings, DAILY_ALARM, DEFAULT_REMINDER_HOUR, NOTIFICATION_ID, SNOOZE_ALARM,
};
pub use retention::RetentionPolicy;
pub use storage::{
    data_dir, KvStore, MemoryStore, SqliteStore, Versioned, SETTINGS_KEY, STREAK_KEY,
};
pub use streak::{StreakState, StreakTracker};
