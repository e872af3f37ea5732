mod cli;
mod commands;
mod format;
mod terminal;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use chime_core::config::{load_dotenv, Config};
use chime_storage::{AlarmStore, SqliteAlarmStore};

use crate::cli::{CliArgs, Command};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = CliArgs::parse();

    // The scheduler is a long-running process; show its firings by default.
    let default_level = match args.command {
        Command::Run { .. } => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    if let Some(db) = args.db {
        config.store.db_path = db;
    }
    config.log_summary();

    let terminal = Terminal::new();
    if let Err(e) = dispatch(args.command, &config, &terminal).await {
        terminal.print_error(&format!("{e:#}"))?;
        std::process::exit(1);
    }
    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn AlarmStore>> {
    let db_path = &config.store.db_path;
    debug!(path = %db_path.display(), "opening alarm store");
    let store = SqliteAlarmStore::open(db_path)
        .await
        .with_context(|| format!("failed to open alarm database '{}'", db_path.display()))?;
    Ok(Arc::new(store))
}

async fn dispatch(command: Command, config: &Config, terminal: &Terminal) -> Result<()> {
    match command {
        Command::Add { name, time, days } => {
            let store = open_store(config).await?;
            commands::add(store.as_ref(), terminal, &name, &time, &days).await
        }
        Command::List => commands::list(open_store(config).await?.as_ref(), terminal).await,
        Command::Toggle { id } => {
            commands::toggle(open_store(config).await?.as_ref(), terminal, id).await
        }
        Command::Delete { id } => {
            commands::delete(open_store(config).await?.as_ref(), terminal, id).await
        }
        Command::Next => commands::next(open_store(config).await?.as_ref(), terminal).await,
        Command::History { limit } => {
            let limit = limit.unwrap_or(config.store.history_limit);
            commands::history(open_store(config).await?.as_ref(), terminal, limit).await
        }
        Command::TestSound => commands::test_sound(config, terminal).await,
        Command::Run { silent } => commands::run(open_store(config).await?, config, silent).await,
    }
}
