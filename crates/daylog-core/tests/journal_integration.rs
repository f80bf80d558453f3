//! Integration tests for the journal engine.
//!
//! These tests drive the public facade the way the two real access
//! contexts do: an interactive session adding and removing entries, and
//! restarts that re-open the store.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use daylog_core::{
    Clock, DayKey, FixedClock, Journal, KvStore, MemoryStore, SqliteStore, MAX_ENTRIES_PER_DAY,
    SETTINGS_KEY, STREAK_KEY,
};
use serde_json::json;

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn day(s: &str) -> DayKey {
    s.parse().unwrap()
}

fn open(store: Arc<dyn KvStore>, clock: Arc<FixedClock>) -> Journal {
    Journal::open(store, clock as Arc<dyn Clock>).unwrap()
}

#[test]
fn consecutive_days_build_a_streak() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(at(2024, 1, 1, 9)));
    let journal = open(store, clock.clone());

    journal.add_entry("learned ownership").unwrap();
    clock.advance(Duration::days(1));
    journal.add_entry("learned borrowing").unwrap();
    clock.advance(Duration::days(1));
    journal.add_entry("learned lifetimes").unwrap();

    assert_eq!(journal.streak().unwrap().count, 3);
}

#[test]
fn a_gap_resets_on_the_next_logged_entry() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(at(2024, 1, 1, 9)));
    let journal = open(store, clock.clone());

    journal.add_entry("before the gap").unwrap();
    assert_eq!(journal.streak().unwrap().count, 1);

    // Three silent days; the streak is untouched until the next add.
    clock.advance(Duration::days(4));
    assert_eq!(journal.streak().unwrap().count, 1);

    journal.add_entry("after the gap").unwrap();
    assert_eq!(journal.streak().unwrap().count, 1);
    assert_eq!(
        journal.streak().unwrap().last_update,
        Some(day("2024-01-05"))
    );
}

#[test]
fn multiple_entries_one_day_count_once() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(at(2024, 1, 1, 9)));
    let journal = open(store, clock);

    for i in 0..5 {
        journal.add_entry(&format!("thought {i}")).unwrap();
    }
    assert_eq!(journal.streak().unwrap().count, 1);
}

#[test]
fn the_day_cap_holds_across_sessions() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(at(2024, 1, 1, 9)));

    {
        let journal = open(store.clone() as Arc<dyn KvStore>, clock.clone());
        for i in 0..MAX_ENTRIES_PER_DAY {
            journal.add_entry(&format!("entry {i}")).unwrap();
        }
    }

    // A fresh session over the same store sees the full day.
    let journal = open(store as Arc<dyn KvStore>, clock);
    assert!(journal.add_entry("over the cap").is_err());
    assert_eq!(journal.today_entries().unwrap().len(), MAX_ENTRIES_PER_DAY);
}

#[test]
fn open_sweeps_aged_days_but_never_singletons_or_foreign_keys() {
    let store = Arc::new(MemoryStore::new());
    store.put("2024-01-01", &json!(["old"]), None).unwrap();
    store.put("2024-01-05", &json!(["old too"]), None).unwrap();
    store.put("foo", &json!("not a day key"), None).unwrap();
    store
        .put(STREAK_KEY, &json!({"count": 2, "lastUpdate": "2024-01-05"}), None)
        .unwrap();

    let clock = Arc::new(FixedClock::new(at(2024, 2, 20, 9)));
    let journal = open(store.clone() as Arc<dyn KvStore>, clock);

    assert!(store.get("2024-01-01").unwrap().is_none());
    assert!(store.get("2024-01-05").unwrap().is_none());
    assert!(store.get("foo").unwrap().is_some());
    assert_eq!(journal.streak().unwrap().count, 2);
    assert!(store.get(SETTINGS_KEY).unwrap().is_some());
}

#[test]
fn state_survives_a_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daylog.db");
    let clock = Arc::new(FixedClock::new(at(2024, 3, 7, 9)));

    {
        let store: Arc<dyn KvStore> = Arc::new(SqliteStore::open_at(path.clone()).unwrap());
        let journal = open(store, clock.clone());
        journal.add_entry("persisted across restarts").unwrap();
    }

    let store: Arc<dyn KvStore> = Arc::new(SqliteStore::open_at(path).unwrap());
    let journal = open(store, clock);
    assert_eq!(
        journal.today_entries().unwrap().entries(),
        ["persisted across restarts"]
    );
    assert_eq!(journal.streak().unwrap().count, 1);
}

#[test]
fn remove_entry_keeps_order_and_streak() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(at(2024, 1, 1, 9)));
    let journal = open(store, clock);

    journal.add_entry("keep").unwrap();
    journal.add_entry("drop").unwrap();
    journal.add_entry("keep too").unwrap();

    let today = journal.today();
    let record = journal.remove_entry(today, 1).unwrap();
    assert_eq!(record.entries(), ["keep", "keep too"]);

    // Deletions never rewind the streak.
    assert_eq!(journal.streak().unwrap().count, 1);
}
