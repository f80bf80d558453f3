pub mod config;
pub mod entry;
pub mod remind;
pub mod streak;
pub mod sweep;

use std::sync::Arc;

use daylog_core::{Journal, KvStore, SqliteStore, SystemClock};

/// Open the on-disk store.
pub fn open_store() -> Result<Arc<dyn KvStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(SqliteStore::open()?))
}

/// Open the on-disk store and a journal session over it.
pub fn open_journal() -> Result<Journal, Box<dyn std::error::Error>> {
    Ok(Journal::open(open_store()?, Arc::new(SystemClock))?)
}
