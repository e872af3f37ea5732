//! Weekday sets for recurring alarms.
//!
//! Persisted as a JSON list of lowercase weekday names
//! (`["monday","friday"]`), held in memory as a 7-bit mask.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::AlarmError;

/// All weekdays in Monday-first order.
pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Lowercase full name used in the persisted `days` column.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parse a weekday from its full or three-letter name, case-insensitive.
pub fn parse_weekday(s: &str) -> Result<Weekday, AlarmError> {
    let lower = s.trim().to_ascii_lowercase();
    ALL_WEEKDAYS
        .iter()
        .copied()
        .find(|day| {
            let name = weekday_name(*day);
            lower == name || lower == name[..3]
        })
        .ok_or_else(|| AlarmError::UnknownWeekday(s.trim().to_string()))
}

/// A set of weekdays on which an alarm recurs.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Weekdays(u8);

impl Weekdays {
    pub const EMPTY: Weekdays = Weekdays(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !Self::bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the selected days Monday-first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_WEEKDAYS.iter().copied().filter(|d| self.contains(*d))
    }

    /// Lowercase full names of the selected days, Monday-first.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(weekday_name).collect()
    }

    /// Parse a comma-separated list such as `mon,wed,friday`.
    pub fn parse_list(s: &str) -> Result<Self, AlarmError> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(parse_weekday)
            .collect()
    }

    /// JSON text stored in the `days` column.
    pub fn to_json(&self) -> String {
        // A list of static strings always serializes.
        serde_json::to_string(&self.names()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Parse the `days` column.
    pub fn from_json(text: &str) -> Result<Self, AlarmError> {
        let names: Vec<String> = serde_json::from_str(text)
            .map_err(|e| AlarmError::Validation(format!("days is not a JSON list: {e}")))?;
        Self::try_from(names)
    }
}

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl TryFrom<Vec<String>> for Weekdays {
    type Error = AlarmError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.iter().map(|n| parse_weekday(n)).collect()
    }
}

impl From<Weekdays> for Vec<String> {
    fn from(days: Weekdays) -> Self {
        days.names().into_iter().map(String::from).collect()
    }
}

impl fmt::Debug for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl fmt::Display for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self
            .names()
            .into_iter()
            .map(|name| {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect();
        f.write_str(&labels.join(", "))
    }
}
