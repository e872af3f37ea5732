//! [`AlarmScheduler`]: matches active alarms against the current minute and
//! fires each at most once per calendar day.

use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chime_core::{truncate_to_minute, Alarm};
use chime_notify::Notifier;
use chime_storage::{AlarmStore, StoreError};

use super::clock::{Clock, SystemClock};
use super::dedup::{DedupKey, FiredToday};
use super::error::SchedulerError;
use super::report::TickReport;

/// The alarm evaluation core.
///
/// Reads a fresh snapshot of active alarms every tick; nothing about the
/// alarm list is cached between ticks. The fired-today set is owned here, so
/// only one scheduler should run against a given store.
pub struct AlarmScheduler {
    pub(crate) store: Arc<dyn AlarmStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) fired: FiredToday,
    pub(crate) shutdown: CancellationToken,
}

/// Result of trying to fire one due alarm.
enum FireOutcome {
    Fired { notifier_failed: bool },
    Deleted,
}

impl AlarmScheduler {
    /// Create a scheduler using the system's local clock.
    pub fn new(store: Arc<dyn AlarmStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            clock: Arc::new(SystemClock),
            fired: FiredToday::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Replace the clock (tests, replay).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Token that stops the loop when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Ask the loop to exit. The current tick, if any, completes first.
    pub fn stop(&self) {
        info!("alarm scheduler stop requested");
        self.shutdown.cancel();
    }

    pub fn fired_today(&self) -> &FiredToday {
        &self.fired
    }

    /// Load today's firings from history into the fired-today set, so a
    /// restarted process does not fire an alarm a second time today.
    pub async fn seed_from_history(&mut self) -> Result<usize, SchedulerError> {
        let today = self.clock.now().date();
        self.fired.roll_to(today);
        let events = self.store.trigger_events_on(today).await?;
        let mut seeded = 0;
        for event in events {
            if self.fired.insert(DedupKey::new(event.alarm_id, today)) {
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!(count = seeded, date = %today, "restored alarms already fired today");
        }
        Ok(seeded)
    }

    /// Run one evaluation pass.
    ///
    /// Returns an error only when the store cannot be read or written; in
    /// that case the rest of the tick is skipped. Malformed records, deleted
    /// alarms and notifier failures are handled per alarm.
    pub async fn tick(&mut self) -> Result<TickReport, SchedulerError> {
        let sampled = self.clock.now();
        let minute = truncate_to_minute(sampled);
        let today = minute.date();
        let mut report = TickReport::new(minute);

        if self.fired.roll_to(today) {
            info!(date = %today, "new day, cleared fired-today set");
            report.day_rolled = true;
        }

        let records = self.store.list_active_alarms().await?;
        debug!(minute = %minute, active = records.len(), "checking alarms");

        for record in &records {
            let alarm = match record.parse() {
                Ok(alarm) => alarm,
                Err(e) => {
                    warn!(alarm_id = record.id, error = %e, "skipping malformed alarm record");
                    report.malformed.push(record.id);
                    continue;
                }
            };

            if !alarm.is_due_at(minute) {
                continue;
            }

            let key = DedupKey::new(alarm.id, today);
            if self.fired.contains(&key) {
                debug!(alarm_id = alarm.id, "already fired today");
                report.duplicates.push(alarm.id);
                continue;
            }

            let fired_at = sampled.with_nanosecond(0).unwrap_or(minute);
            match self.fire(&alarm, key, fired_at).await? {
                FireOutcome::Fired { notifier_failed } => {
                    report.fired.push(alarm.id);
                    if notifier_failed {
                        report.notifier_failures.push(alarm.id);
                    }
                }
                FireOutcome::Deleted => report.abandoned.push(alarm.id),
            }
        }

        Ok(report)
    }

    /// Record the firing, mark it fired for today, then alert.
    ///
    /// History is written first so an alarm deleted since the snapshot never
    /// sounds. The dedup key is recorded before the notifier runs, so a
    /// notifier failure cannot cause a second firing.
    async fn fire(
        &mut self,
        alarm: &Alarm,
        key: DedupKey,
        fired_at: NaiveDateTime,
    ) -> Result<FireOutcome, SchedulerError> {
        match self
            .store
            .append_trigger_event(alarm.id, &alarm.name, fired_at)
            .await
        {
            Ok(event) => {
                debug!(alarm_id = alarm.id, event_id = event.id, "trigger recorded");
            }
            Err(StoreError::AlarmNotFound(id)) => {
                info!(alarm_id = id, "alarm deleted before it could fire, skipping");
                return Ok(FireOutcome::Deleted);
            }
            Err(e) => return Err(e.into()),
        }

        self.fired.insert(key);
        info!(alarm_id = alarm.id, alarm = %alarm.name, time = %alarm.time, "alarm triggered");

        let notifier_failed = match self.notifier.fire(&alarm.name).await {
            Ok(()) => false,
            Err(e) => {
                warn!(
                    alarm_id = alarm.id,
                    channel = self.notifier.channel_name(),
                    error = %e,
                    "alarm notification failed"
                );
                true
            }
        };
        Ok(FireOutcome::Fired { notifier_failed })
    }
}
