use std::sync::Arc;

use daylog_core::{Clock, RetentionPolicy, SystemClock};

use super::open_store;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let removed = RetentionPolicy::new(Arc::clone(&store)).sweep(SystemClock.today())?;

    if removed.is_empty() {
        println!("nothing to remove");
    } else {
        for day in &removed {
            println!("removed {day}");
        }
    }
    Ok(())
}
