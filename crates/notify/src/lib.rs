//! Alarm notification.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable alert channels
//! - Alarm tone synthesis and WAV encoding
//! - Audio notifier playing through an external player on its own task
//! - Silent notifier for headless runs and tests

pub mod audio;
pub mod silent;
pub mod tone;
pub mod traits;

pub use audio::AudioNotifier;
pub use silent::SilentNotifier;
pub use traits::{Notifier, NotifyError};
