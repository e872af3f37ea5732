//! AlarmStore trait definition.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use chime_core::{next_alarm, Alarm, AlarmId, AlarmRecord, NewAlarm, NextAlarm, TriggerEvent};

use crate::error::StoreError;

/// Durable record of alarm definitions and their trigger history.
///
/// Shared between the scheduler and the UI; implementations serialize
/// writers so concurrent calls never corrupt state. Reads return snapshots.
#[async_trait::async_trait]
pub trait AlarmStore: Send + Sync {
    /// Persist a validated alarm. New alarms start active.
    async fn create_alarm(&self, alarm: &NewAlarm) -> Result<AlarmRecord, StoreError>;

    /// All alarms, sorted by time of day ascending.
    async fn list_alarms(&self) -> Result<Vec<AlarmRecord>, StoreError>;

    /// Active alarms, sorted by time of day ascending.
    async fn list_active_alarms(&self) -> Result<Vec<AlarmRecord>, StoreError>;

    async fn get_alarm(&self, id: AlarmId) -> Result<Option<AlarmRecord>, StoreError>;

    /// Flip the active flag and return the new value.
    async fn toggle_alarm(&self, id: AlarmId) -> Result<bool, StoreError>;

    /// Delete an alarm. Returns whether anything was removed. History rows
    /// for the alarm are kept.
    async fn delete_alarm(&self, id: AlarmId) -> Result<bool, StoreError>;

    /// Record a firing. Fails with [`StoreError::AlarmNotFound`] if the alarm
    /// no longer exists; the existence check and the insert are atomic.
    async fn append_trigger_event(
        &self,
        alarm_id: AlarmId,
        alarm_name: &str,
        triggered_at: NaiveDateTime,
    ) -> Result<TriggerEvent, StoreError>;

    /// Most recent firings first.
    async fn recent_trigger_events(&self, limit: u32) -> Result<Vec<TriggerEvent>, StoreError>;

    /// Firings with `start <= triggered_at < end`, oldest first.
    async fn trigger_events_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<TriggerEvent>, StoreError>;

    /// Human-readable backend name for logs (e.g., "sqlite", "memory").
    fn backend_name(&self) -> &str;

    /// Firings that happened on the given local calendar day.
    async fn trigger_events_on(&self, date: NaiveDate) -> Result<Vec<TriggerEvent>, StoreError> {
        let start = date.and_time(chrono::NaiveTime::MIN);
        let end = match date.succ_opt() {
            Some(next) => next.and_time(chrono::NaiveTime::MIN),
            None => NaiveDateTime::MAX,
        };
        self.trigger_events_between(start, end).await
    }

    /// The active alarm that fires soonest after `now`, if any.
    ///
    /// Records that fail to decode are skipped with a warning.
    async fn next_alarm(&self, now: NaiveDateTime) -> Result<Option<NextAlarm>, StoreError> {
        let records = self.list_active_alarms().await?;
        let alarms = decode_records(&records);
        Ok(next_alarm(&alarms, now))
    }
}

/// Decode stored rows, dropping (and logging) the malformed ones.
pub fn decode_records(records: &[AlarmRecord]) -> Vec<Alarm> {
    records
        .iter()
        .filter_map(|record| match record.parse() {
            Ok(alarm) => Some(alarm),
            Err(e) => {
                warn!(alarm_id = record.id, error = %e, "skipping malformed alarm record");
                None
            }
        })
        .collect()
}
