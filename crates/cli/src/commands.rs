use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use tracing::info;

use chime_core::{AlarmId, Config, NewAlarm, TimeOfDay, Weekdays};
use chime_notify::{AudioNotifier, Notifier, SilentNotifier};
use chime_scheduler::AlarmScheduler;
use chime_storage::{AlarmStore, StoreError};

use crate::terminal::Terminal;

fn now() -> chrono::NaiveDateTime {
    Local::now().naive_local()
}

pub async fn add(
    store: &dyn AlarmStore,
    terminal: &Terminal,
    name: &str,
    time: &str,
    days: &str,
) -> Result<()> {
    let time: TimeOfDay = time.parse()?;
    let days = Weekdays::parse_list(days)?;
    let alarm = NewAlarm::new(name, time, days)?;

    let record = store
        .create_alarm(&alarm)
        .await
        .context("failed to save alarm")?;
    terminal.print_info(&format!(
        "Created alarm #{} '{}' at {} on {}",
        record.id,
        alarm.name(),
        alarm.time(),
        alarm.days()
    ))
}

pub async fn list(store: &dyn AlarmStore, terminal: &Terminal) -> Result<()> {
    let records = store.list_alarms().await.context("failed to list alarms")?;
    terminal.print_alarms(&records)
}

pub async fn toggle(store: &dyn AlarmStore, terminal: &Terminal, id: AlarmId) -> Result<()> {
    match store.toggle_alarm(id).await {
        Ok(true) => terminal.print_info(&format!("Alarm #{id} is now active")),
        Ok(false) => terminal.print_info(&format!("Alarm #{id} is now inactive")),
        Err(StoreError::AlarmNotFound(_)) => bail!("no alarm with id {id}"),
        Err(e) => Err(e).context("failed to toggle alarm"),
    }
}

pub async fn delete(store: &dyn AlarmStore, terminal: &Terminal, id: AlarmId) -> Result<()> {
    if !store.delete_alarm(id).await.context("failed to delete alarm")? {
        bail!("no alarm with id {id}");
    }
    terminal.print_info(&format!("Deleted alarm #{id}"))
}

pub async fn next(store: &dyn AlarmStore, terminal: &Terminal) -> Result<()> {
    let next = store
        .next_alarm(now())
        .await
        .context("failed to compute next alarm")?;
    terminal.print_next(next.as_ref())
}

pub async fn history(
    store: &dyn AlarmStore,
    terminal: &Terminal,
    limit: u32,
) -> Result<()> {
    let events = store
        .recent_trigger_events(limit)
        .await
        .context("failed to read alarm history")?;
    terminal.print_history(&events, now())
}

pub async fn test_sound(config: &Config, terminal: &Terminal) -> Result<()> {
    let notifier = AudioNotifier::new(&config.sound).context("invalid sound configuration")?;
    terminal.print_info("Playing test tone...")?;
    notifier
        .play_test_tone()
        .await
        .context("test tone failed")?;
    terminal.print_info("Done")
}

/// Run the scheduler in the foreground until Ctrl-C.
pub async fn run(store: Arc<dyn AlarmStore>, config: &Config, silent: bool) -> Result<()> {
    let notifier: Arc<dyn Notifier> = if silent {
        Arc::new(SilentNotifier::new())
    } else {
        Arc::new(AudioNotifier::new(&config.sound).context("invalid sound configuration")?)
    };

    let handle = AlarmScheduler::new(store, Arc::clone(&notifier)).spawn(
        config.scheduler.tick_interval(),
        config.scheduler.error_backoff(),
    );

    let signal = tokio::signal::ctrl_c().await;
    info!("shutting down");
    notifier.stop().await;
    handle.shutdown().await;
    signal.context("failed to listen for Ctrl-C")
}
