//! Notifier trait definition and shared error types.

/// Errors that can occur while producing an alarm notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("audio file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("player `{command}` failed: {reason}")]
    Player { command: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Capability that turns a firing into an alert the user notices.
///
/// `fire` must return as soon as the alert has been started; long-running
/// playback belongs on its own task. Overlapping calls must not corrupt
/// playback state.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Start alerting for the named alarm.
    async fn fire(&self, alarm_name: &str) -> Result<(), NotifyError>;

    /// Halt whatever is currently sounding. A no-op when idle.
    async fn stop(&self);

    /// Whether an alert is currently in progress.
    fn is_sounding(&self) -> bool {
        false
    }

    /// Human-readable name for this channel (e.g., "audio", "silent").
    fn channel_name(&self) -> &str;
}
