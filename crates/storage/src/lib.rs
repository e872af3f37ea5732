//! Alarm persistence.
//!
//! This crate provides:
//! - `AlarmStore` trait shared by the scheduler and the UI
//! - SQLite implementation (`alarms` + `alarm_history` tables)
//! - In-memory implementation for tests and embedding

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
mod tests_common;

pub use error::StoreError;
pub use memory::MemoryAlarmStore;
pub use sqlite::SqliteAlarmStore;
pub use traits::{decode_records, AlarmStore};
