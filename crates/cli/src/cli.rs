use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Weekly recurring alarms.
///
/// Manages alarms stored in a local SQLite database and runs the scheduler
/// that sounds them.
#[derive(Parser, Debug)]
#[command(name = "chime", about = "Weekly recurring alarms")]
pub struct CliArgs {
    /// Alarm database path (overrides CHIME_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config profile; `{PROFILE}_{KEY}` env vars take precedence over `{KEY}`
    #[arg(long, global = true, env = "CHIME_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an alarm
    Add {
        /// Label shown when the alarm fires
        #[arg(long)]
        name: String,

        /// Time of day, HH:MM (24h, local)
        #[arg(long)]
        time: String,

        /// Comma-separated weekdays, e.g. mon,wed,fri
        #[arg(long)]
        days: String,
    },

    /// List all alarms ordered by time of day
    List,

    /// Flip an alarm between active and inactive
    Toggle { id: i64 },

    /// Remove an alarm
    Delete { id: i64 },

    /// Show the next alarm that will sound
    Next,

    /// Show recently triggered alarms
    History {
        /// Number of entries (defaults to CHIME_HISTORY_LIMIT)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Play a short test tone through the configured player
    TestSound,

    /// Run the scheduler until Ctrl-C
    Run {
        /// Log firings without playing sound
        #[arg(long)]
        silent: bool,
    },
}
