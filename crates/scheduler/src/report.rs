//! Per-tick outcome summary.

use chrono::NaiveDateTime;

use chime_core::AlarmId;

/// What a single evaluation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Minute-resolution time the tick evaluated.
    pub minute: NaiveDateTime,
    /// Whether this tick discarded the previous day's fired set.
    pub day_rolled: bool,
    /// Alarms that fired (history recorded).
    pub fired: Vec<AlarmId>,
    /// Due alarms skipped because they already fired today.
    pub duplicates: Vec<AlarmId>,
    /// Due alarms deleted before their firing could be recorded.
    pub abandoned: Vec<AlarmId>,
    /// Records whose time or weekday data could not be decoded.
    pub malformed: Vec<AlarmId>,
    /// Fired alarms whose notification failed.
    pub notifier_failures: Vec<AlarmId>,
}

impl TickReport {
    pub fn new(minute: NaiveDateTime) -> Self {
        Self {
            minute,
            day_rolled: false,
            fired: Vec::new(),
            duplicates: Vec::new(),
            abandoned: Vec::new(),
            malformed: Vec::new(),
            notifier_failures: Vec::new(),
        }
    }

    /// True when nothing noteworthy happened.
    pub fn is_quiet(&self) -> bool {
        !self.day_rolled
            && self.fired.is_empty()
            && self.abandoned.is_empty()
            && self.malformed.is_empty()
            && self.notifier_failures.is_empty()
    }
}
