use clap::Subcommand;

use super::open_journal;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting
    Get {
        /// Setting key ("reminder-hour" or "notifications")
        key: String,
    },
    /// Set a setting
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let journal = open_journal()?;
    match action {
        ConfigAction::Get { key } => {
            let settings = journal.settings()?;
            match key.as_str() {
                "reminder-hour" => println!("{}", settings.reminder_hour),
                "notifications" => println!("{}", settings.notifications_enabled),
                _ => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = journal.settings()?;
            match key.as_str() {
                "reminder-hour" => settings.reminder_hour = value.parse()?,
                "notifications" => settings.notifications_enabled = value.parse()?,
                _ => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
            let hour_changed = journal.update_settings(settings)?;
            if hour_changed {
                println!("ok; restart `daylog remind watch` for the new hour to take effect");
            } else {
                println!("ok");
            }
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(&journal.settings()?)?;
            println!("{json}");
        }
    }
    Ok(())
}
