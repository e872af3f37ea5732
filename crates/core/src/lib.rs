//! Core types for weekly recurring alarms.
//!
//! This crate provides:
//! - The alarm data model and its persisted shape
//! - Weekday sets and minute-resolution time of day
//! - The next-occurrence calculator
//! - Environment-driven configuration

pub mod alarm;
pub mod config;
pub mod error;
pub mod schedule;
pub mod time;
pub mod weekday;

pub use alarm::{Alarm, AlarmId, AlarmRecord, NewAlarm, TriggerEvent};
pub use config::Config;
pub use error::AlarmError;
pub use schedule::{next_alarm, next_occurrence, NextAlarm};
pub use time::{truncate_to_minute, TimeOfDay};
pub use weekday::{parse_weekday, weekday_name, Weekdays, ALL_WEEKDAYS};
