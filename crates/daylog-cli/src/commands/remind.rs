//! Reminder commands: status, a one-shot check, and a foreground
//! watcher.
//!
//! The watcher is the CLI's stand-in for a host alarm service: alarms
//! live in memory and the loop polls wall-clock time, firing whatever
//! has come due.

use chrono::{Duration, NaiveDateTime};
use clap::Subcommand;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use daylog_core::error::Result as CoreResult;
use daylog_core::{
    ActionOutcome, Alarm, AlarmScheduler, Clock, Journal, Notification, Notifier, ReminderAction,
    ReminderScheduler, SystemClock,
};

use super::{open_journal, open_store};

#[derive(Subcommand)]
pub enum RemindAction {
    /// Show the next fire time for the daily reminder
    Status,
    /// Run one fire-check now (for cron or a host scheduler)
    Run,
    /// Poll in the foreground and print reminders as they come due
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
}

pub fn run(action: RemindAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RemindAction::Status => status(),
        RemindAction::Run => run_once(),
        RemindAction::Watch { interval } => watch(interval),
    }
}

fn status() -> Result<(), Box<dyn std::error::Error>> {
    let journal = open_journal()?;
    let settings = journal.settings()?;
    if !settings.notifications_enabled {
        println!("notifications are disabled");
        return Ok(());
    }
    let next = ReminderScheduler::compute_next_fire(SystemClock.now(), settings.reminder_hour);
    println!("next reminder: {}", next.format("%Y-%m-%d %H:%M"));
    Ok(())
}

fn run_once() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let clock = SystemClock;
    // Opening the journal seeds defaults and sweeps -- this is one of
    // the natural trigger points for deferred maintenance.
    let _journal = Journal::open(Arc::clone(&store), Arc::new(clock))?;

    let reminder = ReminderScheduler::new(
        Arc::clone(&store),
        Arc::new(InProcessScheduler::new()),
        Arc::new(ConsoleNotifier),
    );
    if !reminder.on_fire(clock.today())? {
        println!("nothing to do: entry already logged or notifications off");
    }
    Ok(())
}

fn watch(interval: u64) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let clock = SystemClock;
    let journal = Journal::open(Arc::clone(&store), Arc::new(clock))?;

    let scheduler = Arc::new(InProcessScheduler::new());
    let reminder = ReminderScheduler::new(
        Arc::clone(&store),
        scheduler.clone() as Arc<dyn AlarmScheduler>,
        Arc::new(ConsoleNotifier),
    );

    let settings = journal.settings()?;
    reminder.install_daily_alarm(clock.now(), &settings)?;
    println!(
        "watching; next reminder {}",
        ReminderScheduler::compute_next_fire(clock.now(), settings.reminder_hour)
            .format("%Y-%m-%d %H:%M")
    );

    loop {
        std::thread::sleep(std::time::Duration::from_secs(interval));
        let now = clock.now();
        for alarm in scheduler.take_due(now) {
            log::info!("alarm {} fired", alarm.name);
            if !reminder.on_fire(clock.today())? {
                continue;
            }
            if let Some(action) = prompt_action()? {
                match reminder.on_action(clock.now(), action)? {
                    ActionOutcome::OpenJournal => {
                        println!("log today with: daylog add \"<text>\"");
                    }
                    ActionOutcome::Snoozed => println!("snoozed for an hour"),
                    ActionOutcome::Ignored => {}
                }
            }
        }
    }
}

/// Read one action from the terminal: enter/o opens, l snoozes,
/// anything else leaves the notification up.
fn prompt_action() -> Result<Option<ReminderAction>, Box<dyn std::error::Error>> {
    print!("[Enter] open  [l] remind me later  [x] leave it: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(match line.trim() {
        "" | "o" => Some(ReminderAction::Clicked),
        "l" => Some(ReminderAction::Button(1)),
        _ => None,
    })
}

/// In-memory alarm registry for the watch loop.
///
/// Creating an alarm under an existing name replaces it. Recurring
/// alarms re-arm when they come due, skipping past missed periods so a
/// long sleep fires at most once.
struct InProcessScheduler {
    alarms: Mutex<Vec<Alarm>>,
}

impl InProcessScheduler {
    fn new() -> Self {
        Self {
            alarms: Mutex::new(Vec::new()),
        }
    }

    /// Alarms due at `now`, each reported at most once.
    fn take_due(&self, now: NaiveDateTime) -> Vec<Alarm> {
        let mut alarms = self.alarms.lock().unwrap_or_else(PoisonError::into_inner);
        let mut due = Vec::new();
        let mut pending = Vec::new();

        for alarm in alarms.drain(..) {
            if alarm.when > now {
                pending.push(alarm);
                continue;
            }
            if let Some(period) = alarm.period_minutes {
                let mut next = alarm.clone();
                while next.when <= now {
                    next.when += Duration::minutes(i64::from(period));
                }
                pending.push(next);
            }
            due.push(alarm);
        }

        *alarms = pending;
        due
    }
}

impl AlarmScheduler for InProcessScheduler {
    fn clear_all(&self) -> CoreResult<()> {
        self.alarms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    fn create(&self, alarm: Alarm) -> CoreResult<()> {
        let mut alarms = self.alarms.lock().unwrap_or_else(PoisonError::into_inner);
        alarms.retain(|a| a.name != alarm.name);
        alarms.push(alarm);
        Ok(())
    }
}

/// Prints notifications to the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show(&self, _id: &str, notification: Notification) -> CoreResult<()> {
        println!("\n== {} ==", notification.title);
        println!("{}", notification.message);
        for (index, button) in notification.buttons.iter().enumerate() {
            println!("  [{index}] {button}");
        }
        Ok(())
    }

    fn clear(&self, _id: &str) -> CoreResult<()> {
        Ok(())
    }
}
