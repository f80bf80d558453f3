use daylog_core::{DayKey, Journal, MAX_ENTRIES_PER_DAY};

use super::open_journal;

pub fn add(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let journal = open_journal()?;
    let record = journal.add_entry(text)?;
    let streak = journal.streak()?;
    println!(
        "logged {}/{} for {} (streak: {} day{})",
        record.len(),
        MAX_ENTRIES_PER_DAY,
        journal.today(),
        streak.count,
        if streak.count == 1 { "" } else { "s" }
    );
    Ok(())
}

pub fn list(day: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let journal = open_journal()?;
    let day = resolve_day(&journal, day)?;
    let record = journal.entries(day)?;

    if record.is_empty() {
        println!("no entries for {day}");
        return Ok(());
    }
    for (index, text) in record.entries().iter().enumerate() {
        println!("{index:>2}  {text}");
    }
    println!("{}/{} entries", record.len(), MAX_ENTRIES_PER_DAY);
    Ok(())
}

pub fn remove(index: usize, day: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let journal = open_journal()?;
    let day = resolve_day(&journal, day)?;
    let record = journal.remove_entry(day, index)?;
    println!("removed entry {index} from {day}; {} remaining", record.len());
    Ok(())
}

fn resolve_day(journal: &Journal, day: Option<String>) -> Result<DayKey, Box<dyn std::error::Error>> {
    match day {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(journal.today()),
    }
}
