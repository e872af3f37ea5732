//! SQLite-backed alarm store.

use std::path::Path;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{info, warn};

use chime_core::{AlarmId, AlarmRecord, NewAlarm, TriggerEvent};

use crate::error::StoreError;
use crate::traits::AlarmStore;

/// ISO-8601 local timestamp, second resolution. Sorts lexicographically.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn format_ts(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Column value as UTF-8 text, or `None` if it is NULL or not text.
///
/// Reads the raw bytes without a type check: SQLite is dynamically typed and a
/// column declared TEXT can still hold a BLOB.
fn lenient_text(row: &SqliteRow, column: &str) -> Option<String> {
    match row.try_get_unchecked::<Option<Vec<u8>>, _>(column) {
        Ok(Some(bytes)) => String::from_utf8(bytes).ok(),
        _ => None,
    }
}

/// History timestamps as stored, with a space separator normalized to `T`
/// so text comparison matches [`TIMESTAMP_FORMAT`] bounds.
const TRIGGERED_AT_NORMALIZED: &str = "replace(triggered_at, ' ', 'T')";

fn parse_ts(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Database operations for alarms and their trigger history.
#[derive(Clone)]
pub struct SqliteAlarmStore {
    pool: SqlitePool,
}

impl SqliteAlarmStore {
    /// Open (creating if missing) the database file and initialize tables.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        info!(path = %path.display(), "opened alarm database");
        Self::new(pool).await
    }

    /// Wrap an existing pool and initialize tables.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS alarms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                time TEXT NOT NULL,
                days TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // No foreign key: history outlives the alarm it refers to.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS alarm_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                alarm_id INTEGER NOT NULL,
                alarm_name TEXT NOT NULL,
                triggered_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_alarm_history_triggered_at
             ON alarm_history (triggered_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Decode one alarm row. Only an unreadable `id` fails; any other column
    /// that does not decode is logged and left for [`AlarmRecord::parse`] to
    /// reject, so one damaged row cannot hide the rest of the table.
    fn row_to_alarm(row: &SqliteRow) -> Result<AlarmRecord, StoreError> {
        let id: i64 = row.try_get("id")?;
        let text = |column: &str| {
            lenient_text(row, column).unwrap_or_else(|| {
                warn!(alarm_id = id, column, "undecodable alarm column");
                String::new()
            })
        };
        let name = text("name");
        let time = text("time");
        let days = text("days");
        let created_raw = text("created_at");
        let created_at = parse_ts(&created_raw).unwrap_or_else(|| {
            warn!(alarm_id = id, created_at = %created_raw, "unreadable created_at");
            NaiveDateTime::default()
        });
        let is_active = row.try_get::<bool, _>("is_active").unwrap_or_else(|e| {
            warn!(alarm_id = id, error = %e, "undecodable is_active, treating as inactive");
            false
        });
        Ok(AlarmRecord {
            id,
            name,
            time,
            days,
            is_active,
            created_at,
        })
    }

    fn row_to_event(row: &SqliteRow) -> Result<TriggerEvent, StoreError> {
        let raw: String = row.try_get("triggered_at")?;
        let triggered_at = parse_ts(&raw).ok_or_else(|| {
            StoreError::Unavailable(format!("unreadable triggered_at '{raw}' in alarm_history"))
        })?;
        Ok(TriggerEvent {
            id: row.try_get("id")?,
            alarm_id: row.try_get("alarm_id")?,
            alarm_name: row.try_get("alarm_name")?,
            triggered_at,
        })
    }
}

#[async_trait::async_trait]
impl AlarmStore for SqliteAlarmStore {
    async fn create_alarm(&self, alarm: &NewAlarm) -> Result<AlarmRecord, StoreError> {
        let created_at = Local::now().naive_local();
        let draft = AlarmRecord::from_new(0, alarm, created_at);
        let result = sqlx::query(
            "INSERT INTO alarms (name, time, days, is_active, created_at)
             VALUES (?, ?, ?, 1, ?)",
        )
        .bind(&draft.name)
        .bind(&draft.time)
        .bind(&draft.days)
        .bind(format_ts(created_at))
        .execute(&self.pool)
        .await?;

        Ok(AlarmRecord {
            id: result.last_insert_rowid(),
            ..draft
        })
    }

    async fn list_alarms(&self) -> Result<Vec<AlarmRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, time, days, is_active, created_at
             FROM alarms ORDER BY time, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_alarm).collect()
    }

    async fn list_active_alarms(&self) -> Result<Vec<AlarmRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, time, days, is_active, created_at
             FROM alarms WHERE is_active = 1 ORDER BY time, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_alarm).collect()
    }

    async fn get_alarm(&self, id: AlarmId) -> Result<Option<AlarmRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, time, days, is_active, created_at
             FROM alarms WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::row_to_alarm).transpose()
    }

    async fn toggle_alarm(&self, id: AlarmId) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "UPDATE alarms SET is_active = NOT is_active WHERE id = ? RETURNING is_active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(row.try_get("is_active")?),
            None => Err(StoreError::AlarmNotFound(id)),
        }
    }

    async fn delete_alarm(&self, id: AlarmId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM alarms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_trigger_event(
        &self,
        alarm_id: AlarmId,
        alarm_name: &str,
        triggered_at: NaiveDateTime,
    ) -> Result<TriggerEvent, StoreError> {
        // Single statement: inserts nothing if the alarm was deleted.
        let result = sqlx::query(
            "INSERT INTO alarm_history (alarm_id, alarm_name, triggered_at)
             SELECT id, ?, ? FROM alarms WHERE id = ?",
        )
        .bind(alarm_name)
        .bind(format_ts(triggered_at))
        .bind(alarm_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlarmNotFound(alarm_id));
        }
        Ok(TriggerEvent {
            id: result.last_insert_rowid(),
            alarm_id,
            alarm_name: alarm_name.to_string(),
            triggered_at,
        })
    }

    async fn recent_trigger_events(&self, limit: u32) -> Result<Vec<TriggerEvent>, StoreError> {
        let sql = format!(
            "SELECT id, alarm_id, alarm_name, triggered_at
             FROM alarm_history
             ORDER BY {TRIGGERED_AT_NORMALIZED} DESC, id DESC
             LIMIT ?"
        );
        let rows = sqlx::query(&sql)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_event).collect()
    }

    async fn trigger_events_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<TriggerEvent>, StoreError> {
        let sql = format!(
            "SELECT id, alarm_id, alarm_name, triggered_at
             FROM alarm_history
             WHERE {TRIGGERED_AT_NORMALIZED} >= ? AND {TRIGGERED_AT_NORMALIZED} < ?
             ORDER BY {TRIGGERED_AT_NORMALIZED}, id"
        );
        let rows = sqlx::query(&sql)
        .bind(format_ts(start))
        .bind(format_ts(end))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_event).collect()
    }

    fn backend_name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_common::exercise_store_contract;
    use chime_core::AlarmError;
    use chrono::NaiveDate;

    async fn temp_store() -> (tempfile::TempDir, SqliteAlarmStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteAlarmStore::open(dir.path().join("alarms.db"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn sqlite_store_satisfies_contract() {
        let (_dir, store) = temp_store().await;
        exercise_store_contract(&store).await;
    }

    #[tokio::test]
    async fn reopen_preserves_alarms_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alarms.db");
        let days = chime_core::Weekdays::parse_list("sat,sun").unwrap();
        let new = NewAlarm::new("Weekend", "09:30".parse().unwrap(), days).unwrap();
        let ts = NaiveDateTime::parse_from_str("2024-05-04T09:30:00", TIMESTAMP_FORMAT).unwrap();

        {
            let store = SqliteAlarmStore::open(&path).await.unwrap();
            let created = store.create_alarm(&new).await.unwrap();
            store.append_trigger_event(created.id, "Weekend", ts).await.unwrap();
            store.pool().close().await;
        }

        let store = SqliteAlarmStore::open(&path).await.unwrap();
        let alarms = store.list_alarms().await.unwrap();
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].time, "09:30");
        assert_eq!(alarms[0].days, r#"["saturday","sunday"]"#);
        let history = store.recent_trigger_events(5).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].triggered_at, ts);
    }

    #[tokio::test]
    async fn malformed_rows_are_returned_raw() {
        let (_dir, store) = temp_store().await;
        sqlx::query(
            "INSERT INTO alarms (name, time, days, is_active, created_at)
             VALUES ('Broken', 'noon', 'not json', 1, '2024-01-01T00:00:00')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let active = store.list_active_alarms().await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(active[0].parse().is_err());
    }

    #[tokio::test]
    async fn mistyped_column_is_isolated_to_its_row() {
        let (_dir, store) = temp_store().await;
        let days = chime_core::Weekdays::parse_list("wed").unwrap();
        let new = NewAlarm::new("Good", "08:00".parse().unwrap(), days).unwrap();
        let good = store.create_alarm(&new).await.unwrap();
        sqlx::query(
            "INSERT INTO alarms (name, time, days, is_active, created_at)
             VALUES ('Blob', '08:00', X'FF00', 1, '2024-01-01T00:00:00')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let active = store.list_active_alarms().await.unwrap();
        assert_eq!(active.len(), 2);
        let broken = active.iter().find(|r| r.id != good.id).unwrap();
        assert!(matches!(
            broken.parse(),
            Err(AlarmError::MalformedRecord { .. })
        ));
        let healthy = active.iter().find(|r| r.id == good.id).unwrap();
        assert!(healthy.parse().is_ok());
    }

    #[tokio::test]
    async fn space_separated_history_is_windowed_and_ordered() {
        let (_dir, store) = temp_store().await;
        sqlx::query(
            "INSERT INTO alarm_history (alarm_id, alarm_name, triggered_at) VALUES
             (1, 'Legacy', '2024-05-01 10:00:00'),
             (1, 'Current', '2024-05-01T09:00:00'),
             (1, 'Yesterday', '2024-04-30 23:59:59')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let day = store
            .trigger_events_on(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .await
            .unwrap();
        let names: Vec<&str> = day.iter().map(|e| e.alarm_name.as_str()).collect();
        assert_eq!(names, vec!["Current", "Legacy"]);

        let recent = store.recent_trigger_events(3).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|e| e.alarm_name.as_str()).collect();
        assert_eq!(names, vec!["Legacy", "Current", "Yesterday"]);
    }

    #[test]
    fn timestamps_accept_space_separator() {
        assert!(parse_ts("2024-05-01 08:00:00").is_some());
        assert_eq!(
            format_ts(parse_ts("2024-05-01T08:00:00").unwrap()),
            "2024-05-01T08:00:00"
        );
    }
}
