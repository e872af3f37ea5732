//! Alarm definitions and trigger history records.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::AlarmError;
use crate::schedule;
use crate::time::TimeOfDay;
use crate::weekday::Weekdays;

/// Stable identifier assigned by the store at creation.
pub type AlarmId = i64;

/// A validated request to create an alarm.
///
/// Construction is the only place the name and weekday invariants are
/// enforced; anything persisted went through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlarm {
    name: String,
    time: TimeOfDay,
    days: Weekdays,
}

impl NewAlarm {
    pub fn new(name: &str, time: TimeOfDay, days: Weekdays) -> Result<Self, AlarmError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AlarmError::Validation("alarm name must not be empty".into()));
        }
        if days.is_empty() {
            return Err(AlarmError::Validation(
                "at least one weekday must be selected".into(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            time,
            days,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    pub fn days(&self) -> Weekdays {
        self.days
    }
}

/// An alarm row in its persisted shape: `time` as `"HH:MM"` and `days` as
/// a JSON list of lowercase weekday names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub id: AlarmId,
    pub name: String,
    pub time: String,
    pub days: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl AlarmRecord {
    /// Build the row a store should persist for `new`.
    pub fn from_new(id: AlarmId, new: &NewAlarm, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            name: new.name.clone(),
            time: new.time.to_string(),
            days: new.days.to_json(),
            is_active: true,
            created_at,
        }
    }

    /// Decode the stored time and weekday columns.
    pub fn parse(&self) -> Result<Alarm, AlarmError> {
        let malformed = |reason: String| AlarmError::MalformedRecord {
            alarm_id: self.id,
            reason,
        };
        let time: TimeOfDay = self.time.parse().map_err(|e: AlarmError| malformed(e.to_string()))?;
        let days = Weekdays::from_json(&self.days).map_err(|e| malformed(e.to_string()))?;
        Ok(Alarm {
            id: self.id,
            name: self.name.clone(),
            time,
            days,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

/// A decoded alarm definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alarm {
    pub id: AlarmId,
    pub name: String,
    pub time: TimeOfDay,
    pub days: Weekdays,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Alarm {
    /// Whether this alarm is scheduled for the minute containing `at`.
    ///
    /// Ignores the active flag; callers only pass active alarms.
    pub fn is_due_at(&self, at: NaiveDateTime) -> bool {
        self.days.contains(at.weekday()) && self.time == TimeOfDay::from_naive(at.time())
    }

    /// Earliest instant strictly after `now` at which this alarm fires.
    pub fn next_occurrence(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        schedule::next_occurrence(self.time, self.days, now)
    }
}

/// One firing of an alarm. The name is captured at firing time and is not
/// affected by later renames or deletion of the alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub id: i64,
    pub alarm_id: AlarmId,
    pub alarm_name: String,
    pub triggered_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn record(time: &str, days: &str) -> AlarmRecord {
        AlarmRecord {
            id: 7,
            name: "Standup".into(),
            time: time.into(),
            days: days.into(),
            is_active: true,
            created_at: at(2024, 1, 1, 0, 0, 0),
        }
    }

    #[test]
    fn new_alarm_rejects_blank_name() {
        let days = Weekdays::parse_list("mon").unwrap();
        let err = NewAlarm::new("   ", "08:00".parse().unwrap(), days).unwrap_err();
        assert!(matches!(err, AlarmError::Validation(_)));
    }

    #[test]
    fn new_alarm_rejects_empty_days() {
        let err = NewAlarm::new("Wake", "08:00".parse().unwrap(), Weekdays::EMPTY).unwrap_err();
        assert!(matches!(err, AlarmError::Validation(_)));
    }

    #[test]
    fn new_alarm_trims_name() {
        let days = Weekdays::parse_list("mon").unwrap();
        let alarm = NewAlarm::new("  Wake up ", "08:00".parse().unwrap(), days).unwrap();
        assert_eq!(alarm.name(), "Wake up");
    }

    #[test]
    fn record_round_trips_through_persisted_shape() {
        let days = Weekdays::parse_list("mon,fri").unwrap();
        let new = NewAlarm::new("Gym", "06:30".parse().unwrap(), days).unwrap();
        let row = AlarmRecord::from_new(3, &new, at(2024, 1, 1, 12, 0, 0));
        assert_eq!(row.time, "06:30");
        assert_eq!(row.days, r#"["monday","friday"]"#);
        assert!(row.is_active);

        let alarm = row.parse().unwrap();
        assert_eq!(alarm.days, days);
        assert_eq!(alarm.time.to_string(), "06:30");
    }

    #[test]
    fn malformed_time_reports_alarm_id() {
        let err = record("25:99", r#"["monday"]"#).parse().unwrap_err();
        assert!(matches!(err, AlarmError::MalformedRecord { alarm_id: 7, .. }));
    }

    #[test]
    fn malformed_days_reports_alarm_id() {
        let err = record("08:00", "monday").parse().unwrap_err();
        assert!(matches!(err, AlarmError::MalformedRecord { alarm_id: 7, .. }));
    }

    #[test]
    fn due_matches_weekday_and_minute() {
        // 2024-05-01 is a Wednesday.
        let alarm = record("08:00", r#"["wednesday"]"#).parse().unwrap();
        assert!(alarm.is_due_at(at(2024, 5, 1, 8, 0, 0)));
        assert!(alarm.is_due_at(at(2024, 5, 1, 8, 0, 59)));
        assert!(!alarm.is_due_at(at(2024, 5, 1, 8, 1, 0)));
        assert!(!alarm.is_due_at(at(2024, 5, 2, 8, 0, 0)));
    }
}
