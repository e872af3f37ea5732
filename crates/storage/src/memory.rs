//! In-memory alarm store.
//!
//! Uses `std::sync::RwLock` so it can be shared between the scheduler task and
//! a foreground caller without an async runtime dependency on the lock.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Local, NaiveDateTime};

use chime_core::{AlarmId, AlarmRecord, NewAlarm, TriggerEvent};

use crate::error::StoreError;
use crate::traits::AlarmStore;

#[derive(Debug, Default)]
struct MemoryState {
    alarms: BTreeMap<AlarmId, AlarmRecord>,
    history: Vec<TriggerEvent>,
    last_alarm_id: AlarmId,
    last_event_id: i64,
}

/// Process-local store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryAlarmStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryAlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Unavailable(format!("memory store lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::Unavailable(format!("memory store lock poisoned: {e}")))
    }

    /// Insert a row as-is, bypassing validation. Used to import existing data
    /// and to reproduce damaged records.
    pub fn insert_record(&self, record: AlarmRecord) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.last_alarm_id = state.last_alarm_id.max(record.id);
        state.alarms.insert(record.id, record);
        Ok(())
    }

    fn sorted(mut records: Vec<AlarmRecord>) -> Vec<AlarmRecord> {
        records.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));
        records
    }
}

#[async_trait::async_trait]
impl AlarmStore for MemoryAlarmStore {
    async fn create_alarm(&self, alarm: &NewAlarm) -> Result<AlarmRecord, StoreError> {
        let mut state = self.write()?;
        state.last_alarm_id += 1;
        let record = AlarmRecord::from_new(state.last_alarm_id, alarm, Local::now().naive_local());
        state.alarms.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_alarms(&self) -> Result<Vec<AlarmRecord>, StoreError> {
        let state = self.read()?;
        Ok(Self::sorted(state.alarms.values().cloned().collect()))
    }

    async fn list_active_alarms(&self) -> Result<Vec<AlarmRecord>, StoreError> {
        let state = self.read()?;
        Ok(Self::sorted(
            state.alarms.values().filter(|a| a.is_active).cloned().collect(),
        ))
    }

    async fn get_alarm(&self, id: AlarmId) -> Result<Option<AlarmRecord>, StoreError> {
        Ok(self.read()?.alarms.get(&id).cloned())
    }

    async fn toggle_alarm(&self, id: AlarmId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let record = state
            .alarms
            .get_mut(&id)
            .ok_or(StoreError::AlarmNotFound(id))?;
        record.is_active = !record.is_active;
        Ok(record.is_active)
    }

    async fn delete_alarm(&self, id: AlarmId) -> Result<bool, StoreError> {
        Ok(self.write()?.alarms.remove(&id).is_some())
    }

    async fn append_trigger_event(
        &self,
        alarm_id: AlarmId,
        alarm_name: &str,
        triggered_at: NaiveDateTime,
    ) -> Result<TriggerEvent, StoreError> {
        let mut state = self.write()?;
        if !state.alarms.contains_key(&alarm_id) {
            return Err(StoreError::AlarmNotFound(alarm_id));
        }
        state.last_event_id += 1;
        let event = TriggerEvent {
            id: state.last_event_id,
            alarm_id,
            alarm_name: alarm_name.to_string(),
            triggered_at,
        };
        state.history.push(event.clone());
        Ok(event)
    }

    async fn recent_trigger_events(&self, limit: u32) -> Result<Vec<TriggerEvent>, StoreError> {
        let state = self.read()?;
        let mut events = state.history.clone();
        events.sort_by(|a, b| {
            b.triggered_at
                .cmp(&a.triggered_at)
                .then(b.id.cmp(&a.id))
        });
        events.truncate(limit as usize);
        Ok(events)
    }

    async fn trigger_events_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<TriggerEvent>, StoreError> {
        let state = self.read()?;
        let mut events: Vec<TriggerEvent> = state
            .history
            .iter()
            .filter(|e| e.triggered_at >= start && e.triggered_at < end)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.triggered_at.cmp(&b.triggered_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_common::exercise_store_contract;

    #[tokio::test]
    async fn memory_store_satisfies_contract() {
        exercise_store_contract(&MemoryAlarmStore::new()).await;
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryAlarmStore::new();
        let other = store.clone();
        let days = chime_core::Weekdays::parse_list("mon").unwrap();
        let new = NewAlarm::new("Shared", "08:00".parse().unwrap(), days).unwrap();
        store.create_alarm(&new).await.unwrap();
        assert_eq!(other.list_alarms().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insert_record_keeps_ids_monotonic() {
        let store = MemoryAlarmStore::new();
        store
            .insert_record(AlarmRecord {
                id: 10,
                name: "Imported".into(),
                time: "07:00".into(),
                days: r#"["monday"]"#.into(),
                is_active: true,
                created_at: Local::now().naive_local(),
            })
            .unwrap();
        let days = chime_core::Weekdays::parse_list("tue").unwrap();
        let new = NewAlarm::new("Next", "08:00".parse().unwrap(), days).unwrap();
        let created = store.create_alarm(&new).await.unwrap();
        assert_eq!(created.id, 11);
    }
}
