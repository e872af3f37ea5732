use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlarmError {
    /// Rejected at creation time; never reaches the store.
    #[error("validation error: {0}")]
    Validation(String),

    /// A persisted alarm whose time or weekday data cannot be parsed.
    #[error("malformed alarm record {alarm_id}: {reason}")]
    MalformedRecord { alarm_id: i64, reason: String },

    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("unknown weekday '{0}'")]
    UnknownWeekday(String),
}
