//! The in-memory "already fired today" set.

use std::collections::HashSet;

use chrono::NaiveDate;

use chime_core::AlarmId;

/// Identifies one alarm on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub alarm_id: AlarmId,
    pub date: NaiveDate,
}

impl DedupKey {
    pub fn new(alarm_id: AlarmId, date: NaiveDate) -> Self {
        Self { alarm_id, date }
    }
}

/// Keys of alarms fired on the current local day.
///
/// Owned by a single scheduler; cleared the first time a tick observes a
/// different calendar date than the one it tracks.
#[derive(Debug, Default)]
pub struct FiredToday {
    date: Option<NaiveDate>,
    keys: HashSet<DedupKey>,
}

impl FiredToday {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the set to `today`. Returns `true` if a previous day's keys were
    /// discarded.
    pub fn roll_to(&mut self, today: NaiveDate) -> bool {
        match self.date {
            Some(date) if date == today => false,
            Some(_) => {
                self.keys.clear();
                self.date = Some(today);
                true
            }
            None => {
                self.keys.retain(|k| k.date == today);
                self.date = Some(today);
                false
            }
        }
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, key: DedupKey) -> bool {
        self.keys.insert(key)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn rolling_to_same_day_keeps_keys() {
        let mut fired = FiredToday::new();
        assert!(!fired.roll_to(day(1)));
        fired.insert(DedupKey::new(1, day(1)));
        assert!(!fired.roll_to(day(1)));
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn rolling_to_new_day_clears() {
        let mut fired = FiredToday::new();
        fired.roll_to(day(1));
        fired.insert(DedupKey::new(1, day(1)));
        assert!(fired.roll_to(day(2)));
        assert!(fired.is_empty());
        assert_eq!(fired.date(), Some(day(2)));
    }

    #[test]
    fn first_roll_drops_keys_from_other_days() {
        let mut fired = FiredToday::new();
        fired.insert(DedupKey::new(1, day(1)));
        fired.insert(DedupKey::new(2, day(2)));
        assert!(!fired.roll_to(day(2)));
        assert_eq!(fired.len(), 1);
        assert!(fired.contains(&DedupKey::new(2, day(2))));
    }

    #[test]
    fn insert_reports_duplicates() {
        let mut fired = FiredToday::new();
        assert!(fired.insert(DedupKey::new(3, day(1))));
        assert!(!fired.insert(DedupKey::new(3, day(1))));
    }
}
