use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub store: StoreConfig,
    pub scheduler: SchedulerConfig,
    pub sound: SoundConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CHIME_PROFILE`. When set (e.g. `TEST`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CHIME_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            store: StoreConfig::from_env_profiled(p),
            scheduler: SchedulerConfig::from_env_profiled(p),
            sound: SoundConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  store:      db_path={}, history_limit={}", self.store.db_path.display(), self.store.history_limit);
        tracing::info!(
            "  scheduler:  tick={}s, error_backoff={}s",
            self.scheduler.tick_secs,
            self.scheduler.error_backoff_secs
        );
        tracing::info!(
            "  sound:      player={}, duration={}s, sample_rate={}",
            self.sound.player,
            self.sound.duration_secs,
            self.sound.sample_rate
        );
    }
}

// ── Store ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// Default number of history rows shown by list-recent-history.
    pub history_limit: u32,
}

impl StoreConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            db_path: PathBuf::from(profiled_env_or(p, "CHIME_DB_PATH", "alarms.db")),
            history_limit: profiled_env_u32(p, "CHIME_HISTORY_LIMIT", 5),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("alarms.db"),
            history_limit: 5,
        }
    }
}

// ── Scheduler ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub tick_secs: u64,
    pub error_backoff_secs: u64,
}

impl SchedulerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            tick_secs: profiled_env_u64(p, "CHIME_TICK_SECS", 30).max(1),
            error_backoff_secs: profiled_env_u64(p, "CHIME_ERROR_BACKOFF_SECS", 60).max(1),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: 30,
            error_backoff_secs: 60,
        }
    }
}

// ── Sound ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Player command line; the WAV path is appended as the last argument.
    pub player: String,
    /// How long an alarm keeps sounding.
    pub duration_secs: u64,
    pub sample_rate: u32,
}

fn default_player() -> &'static str {
    if cfg!(target_os = "macos") {
        "afplay"
    } else {
        "aplay -q"
    }
}

impl SoundConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            player: profiled_env_or(p, "CHIME_PLAYER", default_player()),
            duration_secs: profiled_env_u64(p, "CHIME_SOUND_DURATION_SECS", 30),
            sample_rate: profiled_env_u32(p, "CHIME_SAMPLE_RATE", 22_050).max(1),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            player: default_player().to_string(),
            duration_secs: 30,
            sample_rate: 22_050,
        }
    }
}
