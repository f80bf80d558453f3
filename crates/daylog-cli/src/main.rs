use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;

#[derive(Parser)]
#[command(name = "daylog", version, about = "Daylog CLI")]
struct Cli {
    /// Level for the file log under the data directory
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an entry to today's journal
    Add {
        /// Entry text (1-280 characters)
        text: String,
    },
    /// List a day's entries
    List {
        /// Day to list (YYYY-MM-DD, default today)
        #[arg(long)]
        day: Option<String>,
    },
    /// Remove an entry by its position
    Remove {
        /// Position as shown by `list`
        index: usize,
        /// Day to remove from (YYYY-MM-DD, default today)
        #[arg(long)]
        day: Option<String>,
    },
    /// Show the current streak
    Streak,
    /// Settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Remove day partitions older than the retention window
    Sweep,
    /// Reminder control
    Remind {
        #[command(subcommand)]
        action: commands::remind::RemindAction,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

fn main() {
    let cli = Cli::parse();
    init_file_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Add { text } => commands::entry::add(&text),
        Commands::List { day } => commands::entry::list(day),
        Commands::Remove { index, day } => commands::entry::remove(index, day),
        Commands::Streak => commands::streak::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Sweep => commands::sweep::run(),
        Commands::Remind { action } => commands::remind::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "daylog", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Best-effort file logging; a missing log file must never block a
/// journal command.
fn init_file_logging(level: &str) {
    if let Ok(dir) = daylog_core::data_dir() {
        if let Err(err) = daylog_core::logging::init_logging(level, &dir.join("logs")) {
            eprintln!("warning: {err}");
        }
    }
}
