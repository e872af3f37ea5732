//! Background evaluation of recurring alarms.
//!
//! An [`AlarmScheduler`] samples local time on a fixed cadence, matches active
//! alarms against the current minute and weekday, and fires each alarm at most
//! once per calendar day: it appends a trigger event to the store and hands
//! the alert to a [`Notifier`](chime_notify::Notifier).
//!
//! The fired-today set lives in the scheduler itself and is seeded from the
//! store's history when the loop starts, so a restart does not refire an
//! alarm that already went off today. Missed minutes (host asleep, process
//! stalled) are not caught up.

pub mod clock;
mod core;
pub mod dedup;
mod error;
mod report;
mod runner;


pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::core::AlarmScheduler;
pub use self::dedup::{DedupKey, FiredToday};
pub use self::error::SchedulerError;
pub use self::report::TickReport;
pub use self::runner::SchedulerHandle;
