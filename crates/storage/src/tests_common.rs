//! Behaviour every [`AlarmStore`] backend must share.

use chrono::{NaiveDate, NaiveDateTime};

use chime_core::{NewAlarm, Weekdays};

use crate::error::StoreError;
use crate::traits::AlarmStore;

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, d)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn new_alarm(name: &str, time: &str, days: &str) -> NewAlarm {
    NewAlarm::new(name, time.parse().unwrap(), Weekdays::parse_list(days).unwrap()).unwrap()
}

pub(crate) async fn exercise_store_contract(store: &dyn AlarmStore) {
    // create + list sorted by time
    let late = store.create_alarm(&new_alarm("Late", "21:15", "mon")).await.unwrap();
    let early = store.create_alarm(&new_alarm("Early", "06:00", "wed,fri")).await.unwrap();
    assert!(late.is_active);
    assert_eq!(early.days, r#"["wednesday","friday"]"#);

    let all = store.list_alarms().await.unwrap();
    let names: Vec<&str> = all.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Early", "Late"]);

    // toggle flips and list_active follows
    assert!(!store.toggle_alarm(late.id).await.unwrap());
    let active = store.list_active_alarms().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, early.id);
    assert!(store.toggle_alarm(late.id).await.unwrap());
    assert_eq!(store.list_active_alarms().await.unwrap().len(), 2);

    assert!(matches!(
        store.toggle_alarm(9_999).await,
        Err(StoreError::AlarmNotFound(9_999))
    ));

    // history: append, recent-first, date window
    store.append_trigger_event(early.id, "Early", at(1, 6, 0)).await.unwrap();
    store.append_trigger_event(late.id, "Late", at(6, 21, 15)).await.unwrap();
    store.append_trigger_event(early.id, "Early", at(3, 6, 0)).await.unwrap();

    let recent = store.recent_trigger_events(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].triggered_at, at(6, 21, 15));
    assert_eq!(recent[1].triggered_at, at(3, 6, 0));

    let on_third = store
        .trigger_events_on(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(on_third.len(), 1);
    assert_eq!(on_third[0].alarm_id, early.id);

    // next alarm: 2024-05-01 is a Wednesday, Early already passed at 09:00
    let next = store.next_alarm(at(1, 9, 0)).await.unwrap().unwrap();
    assert_eq!(next.alarm.id, early.id);
    assert_eq!(next.at, at(3, 6, 0));

    // delete keeps history and blocks further appends
    assert!(store.delete_alarm(early.id).await.unwrap());
    assert!(!store.delete_alarm(early.id).await.unwrap());
    assert!(store.get_alarm(early.id).await.unwrap().is_none());
    assert!(matches!(
        store.append_trigger_event(early.id, "Early", at(8, 6, 0)).await,
        Err(StoreError::AlarmNotFound(_))
    ));
    let history = store.recent_trigger_events(10).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history.iter().filter(|e| e.alarm_name == "Early").count(),
        2
    );

    // no active alarms -> no next alarm
    store.toggle_alarm(late.id).await.unwrap();
    assert!(store.next_alarm(at(1, 9, 0)).await.unwrap().is_none());
}
