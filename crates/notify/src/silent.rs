//! Notifier that makes no sound. Logs and counts firings.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::info;

use crate::traits::{Notifier, NotifyError};

#[derive(Default)]
pub struct SilentNotifier {
    fired: AtomicUsize,
    names: Mutex<Vec<String>>,
    sounding: AtomicBool,
}

impl SilentNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire_count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }

    /// Alarm names passed to `fire`, in call order.
    pub fn fired_names(&self) -> Vec<String> {
        self.names.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl Notifier for SilentNotifier {
    async fn fire(&self, alarm_name: &str) -> Result<(), NotifyError> {
        info!(alarm = alarm_name, "alarm fired (silent)");
        self.fired.fetch_add(1, Ordering::SeqCst);
        self.names
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(alarm_name.to_string());
        self.sounding.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.sounding.store(false, Ordering::SeqCst);
    }

    fn is_sounding(&self) -> bool {
        self.sounding.load(Ordering::SeqCst)
    }

    fn channel_name(&self) -> &str {
        "silent"
    }
}
