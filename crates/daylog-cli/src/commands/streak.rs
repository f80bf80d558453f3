use super::open_journal;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let journal = open_journal()?;
    let streak = journal.streak()?;
    match streak.last_update {
        Some(day) => println!("{} day(s), last logged {day}", streak.count),
        None => println!("no entries logged yet"),
    }
    Ok(())
}
