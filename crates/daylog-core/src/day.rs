//! Day-keyed data model: day keys, day records, size limits.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum characters per entry, counted after trimming.
pub const MAX_CHARS: usize = 280;
/// Maximum entries a single day may hold.
pub const MAX_ENTRIES_PER_DAY: usize = 10;
/// Days a partition is kept before the retention sweep removes it.
pub const MAX_DAYS_TO_KEEP: i64 = 30;

/// Calendar-date key identifying one day's journal partition.
///
/// Renders and parses strictly as `YYYY-MM-DD`; this string is the
/// storage key and the unit of retention and streak comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Day key for the local date of `at`.
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        Self(at.date())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Whole days elapsed from `earlier` to `self`; negative when
    /// `earlier` is in the future.
    pub fn days_since(&self, earlier: DayKey) -> i64 {
        (self.0 - earlier.0).num_days()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(DayKey)
    }
}

/// Ordered entries for one day, insertion order preserved.
///
/// Persisted as a plain JSON array of strings under the day key. A day
/// record may be emptied by deletions; only the retention sweep removes
/// the key itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayRecord {
    entries: Vec<String>,
}

impl DayRecord {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub(crate) fn push(&mut self, text: String) {
        self.entries.push(text);
    }

    pub(crate) fn remove(&mut self, index: usize) -> String {
        self.entries.remove(index)
    }
}
