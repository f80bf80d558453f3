//! Consecutive-day streak tracking.
//!
//! The streak advances only when a day transitions from zero entries to
//! at least one; reads never mutate it. A gap therefore resets lazily,
//! the next time an entry is actually logged.

use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::day::DayKey;
use crate::error::{Result, StorageError};
use crate::storage::{KvStore, CAS_RETRY_LIMIT, STREAK_KEY};

/// Persisted streak counter. Singleton under the `streak` key.
///
/// The stored shape is `{"count": N, "lastUpdate": "YYYY-MM-DD"}` with
/// an empty string while no entry has ever been logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub count: u32,
    #[serde(rename = "lastUpdate", with = "day_key_or_empty")]
    pub last_update: Option<DayKey>,
}

mod day_key_or_empty {
    use crate::day::DayKey;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DayKey>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(day) => serializer.serialize_str(&day.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DayKey>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

/// Derives and maintains the consecutive-day streak from entry
/// activity.
pub struct StreakTracker {
    store: Arc<dyn KvStore>,
}

impl StreakTracker {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Current state. An absent or malformed singleton reads as zero.
    pub fn state(&self) -> Result<StreakState> {
        let (state, _) = self.state_versioned()?;
        Ok(state)
    }

    /// Current streak length without mutating state.
    pub fn count(&self) -> Result<u32> {
        Ok(self.state()?.count)
    }

    /// Advance the streak for `today`.
    ///
    /// Call only after an entry was successfully added for `today` --
    /// a day with zero entries must never move the counter.
    ///
    /// - Already counted today: no-op.
    /// - Yesterday (or never) counted: `count += 1`.
    /// - Anything else: the streak restarts at 1.
    pub fn record_activity(&self, today: DayKey) -> Result<StreakState> {
        for _ in 0..CAS_RETRY_LIMIT {
            let (mut state, version) = self.state_versioned()?;
            if state.last_update == Some(today) {
                return Ok(state);
            }

            state.count = if is_consecutive(state.last_update, today) {
                state.count + 1
            } else {
                1
            };
            state.last_update = Some(today);

            let value = serde_json::to_value(&state)?;
            match self.store.put(STREAK_KEY, &value, version) {
                Ok(_) => return Ok(state),
                Err(StorageError::Conflict { .. }) => {
                    warn!("concurrent streak update; retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StorageError::Conflict {
            key: STREAK_KEY.to_string(),
        }
        .into())
    }

    fn state_versioned(&self) -> Result<(StreakState, Option<u64>)> {
        match self.store.get(STREAK_KEY) {
            Ok(Some(stored)) => match serde_json::from_value::<StreakState>(stored.value) {
                Ok(state) => Ok((state, Some(stored.version))),
                Err(_) => {
                    warn!("streak state has an unexpected shape; starting over");
                    Ok((StreakState::default(), Some(stored.version)))
                }
            },
            Ok(None) => Ok((StreakState::default(), Some(0))),
            Err(StorageError::Corrupt { .. }) => {
                warn!("streak state is corrupt; it will be replaced on the next update");
                Ok((StreakState::default(), None))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `true` when `today` directly follows `last`, or when nothing was
/// ever logged before.
fn is_consecutive(last: Option<DayKey>, today: DayKey) -> bool {
    match last {
        None => true,
        Some(last) => today.days_since(last) == 1,
    }
}
