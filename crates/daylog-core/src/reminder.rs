//! Daily reminder scheduling, fire-time suppression, and snooze.
//!
//! The host's alarm and notification facilities sit behind the
//! [`AlarmScheduler`] and [`Notifier`] traits, so the decision logic --
//! when to fire, when to suppress, how snooze interacts with the daily
//! recurrence -- is testable with fakes.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::day::DayKey;
use crate::entries::EntryStore;
use crate::error::{Result, StorageError};
use crate::storage::{KvStore, SETTINGS_KEY};

/// Name of the recurring daily reminder alarm.
pub const DAILY_ALARM: &str = "daily-reminder";
/// Name of the one-shot snooze alarm.
pub const SNOOZE_ALARM: &str = "snooze-reminder";
/// Notification id; at most one reminder notification exists at a time.
pub const NOTIFICATION_ID: &str = "daylog-reminder";

/// Hour of day the reminder defaults to.
pub const DEFAULT_REMINDER_HOUR: u32 = 20;

const SNOOZE_MINUTES: i64 = 60;
const DAY_MINUTES: u32 = 24 * 60;

/// User settings. Singleton under the `settings` key, created with
/// defaults on first run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Hour of day (0-23) the daily reminder fires.
    pub reminder_hour: u32,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminder_hour: DEFAULT_REMINDER_HOUR,
            notifications_enabled: true,
        }
    }
}

/// A wake-up request handed to the host scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub name: String,
    pub when: NaiveDateTime,
    /// Repeat period in minutes; `None` for one-shot alarms.
    pub period_minutes: Option<u32>,
}

/// Host alarm surface.
///
/// Creating an alarm under an existing name replaces that alarm;
/// schedules are cancelled by replacement or [`clear_all`], never by
/// interrupting in-flight work.
///
/// [`clear_all`]: AlarmScheduler::clear_all
pub trait AlarmScheduler: Send + Sync {
    fn clear_all(&self) -> Result<()>;
    fn create(&self, alarm: Alarm) -> Result<()>;
}

/// A user-facing alert with action buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub buttons: Vec<String>,
}

impl Notification {
    /// The daily journal reminder.
    pub fn reminder() -> Self {
        Self {
            title: "Time for today's journal".to_string(),
            message: "Nothing logged yet today. Take a moment to reflect and record."
                .to_string(),
            buttons: vec!["Open journal".to_string(), "Remind me later".to_string()],
        }
    }
}

/// Host notification surface.
pub trait Notifier: Send + Sync {
    fn show(&self, id: &str, notification: Notification) -> Result<()>;
    fn clear(&self, id: &str) -> Result<()>;
}

/// What the user did with the reminder notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    /// Bare click on the notification body.
    Clicked,
    /// A button press, by position.
    Button(usize),
}

/// What the embedding shell must do after an action was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Surface the journal entry UI.
    OpenJournal,
    /// Snooze handled; nothing further to do.
    Snoozed,
    /// Unknown button; the notification stays up.
    Ignored,
}

/// Computes fire times, installs the recurring alarm, and decides at
/// fire time whether to notify.
pub struct ReminderScheduler {
    store: Arc<dyn KvStore>,
    entries: EntryStore,
    scheduler: Arc<dyn AlarmScheduler>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn KvStore>,
        scheduler: Arc<dyn AlarmScheduler>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let entries = EntryStore::new(Arc::clone(&store));
        Self {
            store,
            entries,
            scheduler,
            notifier,
        }
    }

    /// First fire time for a daily reminder at `reminder_hour`.
    ///
    /// Today at `reminder_hour:00:00` when that is still ahead,
    /// otherwise the same time tomorrow. The recurrence period is
    /// exactly 24 hours from this anchor.
    pub fn compute_next_fire(now: NaiveDateTime, reminder_hour: u32) -> NaiveDateTime {
        let at_hour = NaiveTime::from_hms_opt(reminder_hour.min(23), 0, 0)
            .unwrap_or(NaiveTime::MIN);
        let target = now.date().and_time(at_hour);
        if target <= now {
            target + Duration::days(1)
        } else {
            target
        }
    }

    /// Clear any previous schedule and install the recurring daily
    /// alarm.
    ///
    /// Call on first run and after every reminder-hour change;
    /// rescheduling replaces, never stacks.
    pub fn install_daily_alarm(&self, now: NaiveDateTime, settings: &Settings) -> Result<()> {
        self.scheduler.clear_all()?;
        self.scheduler.create(Alarm {
            name: DAILY_ALARM.to_string(),
            when: Self::compute_next_fire(now, settings.reminder_hour),
            period_minutes: Some(DAY_MINUTES),
        })
    }

    /// Handle a wake-up for `day`. Returns whether a notification was
    /// shown.
    ///
    /// The day's record is re-read here, so a stale or duplicated alarm
    /// never notifies over a day that already has an entry, and a
    /// missed fire cannot corrupt anything on resume.
    pub fn on_fire(&self, day: DayKey) -> Result<bool> {
        let settings = load_settings(self.store.as_ref())?;
        if !settings.notifications_enabled {
            return Ok(false);
        }
        if !self.entries.load(day)?.is_empty() {
            return Ok(false);
        }
        self.notifier.show(NOTIFICATION_ID, Notification::reminder())?;
        Ok(true)
    }

    /// Schedule a one-shot check at `now + 1h`, leaving the recurring
    /// anchor untouched.
    ///
    /// When the daily alarm's natural next fire is at or before the
    /// snooze target, the snooze is dropped -- the earlier daily fire
    /// serves the reminder, and two reminders never land within one
    /// snooze window. Returns the installed fire time, or `None` when
    /// dropped.
    pub fn on_snooze(&self, now: NaiveDateTime) -> Result<Option<NaiveDateTime>> {
        let snooze_at = now + Duration::minutes(SNOOZE_MINUTES);
        let settings = load_settings(self.store.as_ref())?;
        if Self::compute_next_fire(now, settings.reminder_hour) <= snooze_at {
            return Ok(None);
        }
        self.scheduler.create(Alarm {
            name: SNOOZE_ALARM.to_string(),
            when: snooze_at,
            period_minutes: None,
        })?;
        Ok(Some(snooze_at))
    }

    /// React to the user's interaction with the reminder notification.
    ///
    /// A bare click and the first button both open the journal; the
    /// second button snoozes. Every handled action dismisses the
    /// notification.
    pub fn on_action(&self, now: NaiveDateTime, action: ReminderAction) -> Result<ActionOutcome> {
        let outcome = match action {
            ReminderAction::Clicked | ReminderAction::Button(0) => ActionOutcome::OpenJournal,
            ReminderAction::Button(1) => {
                self.on_snooze(now)?;
                ActionOutcome::Snoozed
            }
            ReminderAction::Button(_) => ActionOutcome::Ignored,
        };
        if outcome != ActionOutcome::Ignored {
            self.notifier.clear(NOTIFICATION_ID)?;
        }
        Ok(outcome)
    }
}

/// Settings singleton; absent or malformed state reads as defaults
/// rather than failing a fire-time decision.
pub(crate) fn load_settings(store: &dyn KvStore) -> Result<Settings> {
    match store.get(SETTINGS_KEY) {
        Ok(Some(stored)) => Ok(serde_json::from_value(stored.value).unwrap_or_else(|_| {
            warn!("settings have an unexpected shape; using defaults");
            Settings::default()
        })),
        Ok(None) => Ok(Settings::default()),
        Err(StorageError::Corrupt { .. }) => {
            warn!("settings are corrupt; using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(e.into()),
    }
}
