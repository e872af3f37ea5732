//! Next-occurrence calculation for weekly recurring alarms.
//!
//! Shared by the scheduler and by anything that displays the upcoming alarm.
//! All instants are naive local wall-clock time.

use chrono::{Datelike, Days, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::alarm::Alarm;
use crate::time::TimeOfDay;
use crate::weekday::Weekdays;

/// Days to move forward from `today` to reach `target`.
///
/// When `target` is today the result is 0 if the alarm is still ahead and 7
/// if it has already passed; the modulo branch never yields 0.
fn day_offset(today: Weekday, target: Weekday, still_ahead_today: bool) -> u64 {
    if target == today {
        return if still_ahead_today { 0 } else { 7 };
    }
    let today_idx = today.num_days_from_monday() as i64;
    let target_idx = target.num_days_from_monday() as i64;
    (target_idx - today_idx).rem_euclid(7) as u64
}

/// Earliest instant after `now` at which an alarm with this schedule fires,
/// or `None` when `days` is empty.
///
/// An alarm whose time equals the current minute counts as passed.
pub fn next_occurrence(
    time: TimeOfDay,
    days: Weekdays,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let alarm_time = time.to_naive();
    let still_ahead_today = alarm_time > now.time();
    let today = now.weekday();

    days.iter()
        .filter_map(|day| {
            let offset = day_offset(today, day, still_ahead_today);
            now.date()
                .checked_add_days(Days::new(offset))
                .map(|date| date.and_time(alarm_time))
        })
        .min()
}

/// The alarm that fires soonest, with the instant it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAlarm {
    pub alarm: Alarm,
    pub at: NaiveDateTime,
}

/// Pick the globally earliest upcoming firing among the active alarms.
///
/// Inactive alarms are ignored. Returns `None` when nothing is scheduled.
pub fn next_alarm<'a, I>(alarms: I, now: NaiveDateTime) -> Option<NextAlarm>
where
    I: IntoIterator<Item = &'a Alarm>,
{
    alarms
        .into_iter()
        .filter(|alarm| alarm.is_active)
        .filter_map(|alarm| alarm.next_occurrence(now).map(|at| (alarm, at)))
        .min_by_key(|(_, at)| *at)
        .map(|(alarm, at)| NextAlarm {
            alarm: alarm.clone(),
            at,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    // 2024-05-01 is a Wednesday.
    fn wednesday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn alarm(id: i64, time: &str, days: &str, active: bool) -> Alarm {
        Alarm {
            id,
            name: format!("alarm-{id}"),
            time: time.parse().unwrap(),
            days: Weekdays::parse_list(days).unwrap(),
            is_active: active,
            created_at: wednesday(0, 0),
        }
    }

    #[test]
    fn passed_today_moves_to_next_selected_day() {
        let next = next_occurrence(
            "08:00".parse().unwrap(),
            Weekdays::parse_list("wed,fri").unwrap(),
            wednesday(9, 0),
        )
        .unwrap();
        assert_eq!(next.date(), NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert_eq!(next.weekday(), Weekday::Fri);
        assert_eq!(next.time(), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    }

    #[test]
    fn later_today_fires_today() {
        let next = next_occurrence(
            "10:00".parse().unwrap(),
            Weekdays::parse_list("wed").unwrap(),
            wednesday(9, 0),
        )
        .unwrap();
        assert_eq!(next, wednesday(10, 0));
    }

    #[test]
    fn passed_today_with_only_today_selected_waits_a_week() {
        let next = next_occurrence(
            "08:00".parse().unwrap(),
            Weekdays::parse_list("wed").unwrap(),
            wednesday(9, 0),
        )
        .unwrap();
        assert_eq!(next, wednesday(8, 0) + chrono::Duration::days(7));
    }

    #[test]
    fn current_minute_counts_as_passed() {
        let next = next_occurrence(
            "09:00".parse().unwrap(),
            Weekdays::parse_list("wed").unwrap(),
            wednesday(9, 0),
        )
        .unwrap();
        assert_eq!(next, wednesday(9, 0) + chrono::Duration::days(7));
    }

    #[test]
    fn earlier_weekday_wraps_into_next_week() {
        let next = next_occurrence(
            "07:00".parse().unwrap(),
            Weekdays::parse_list("mon").unwrap(),
            wednesday(9, 0),
        )
        .unwrap();
        assert_eq!(next.date(), NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }

    #[test]
    fn picks_minimum_over_all_selected_days() {
        let next = next_occurrence(
            "07:00".parse().unwrap(),
            Weekdays::parse_list("mon,tue,thu,sun").unwrap(),
            wednesday(9, 0),
        )
        .unwrap();
        assert_eq!(next.weekday(), Weekday::Thu);
    }

    #[test]
    fn empty_day_set_has_no_occurrence() {
        assert!(
            next_occurrence("07:00".parse().unwrap(), Weekdays::EMPTY, wednesday(9, 0)).is_none()
        );
    }

    #[test]
    fn next_alarm_is_global_minimum_over_active() {
        let alarms = vec![
            alarm(1, "08:00", "fri", true),
            alarm(2, "11:00", "wed", true),
            alarm(3, "09:30", "wed", false),
        ];
        let next = next_alarm(&alarms, wednesday(9, 0)).unwrap();
        assert_eq!(next.alarm.id, 2);
        assert_eq!(next.at, wednesday(11, 0));
    }

    #[test]
    fn next_alarm_none_without_active_alarms() {
        let none: Vec<Alarm> = Vec::new();
        assert!(next_alarm(&none, wednesday(9, 0)).is_none());
        let inactive = vec![alarm(1, "10:00", "wed", false)];
        assert!(next_alarm(&inactive, wednesday(9, 0)).is_none());
    }
}
