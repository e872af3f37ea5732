//! Audible notifier that plays the synthesized alarm pattern through an
//! external player command.
//!
//! Playback runs on its own tokio task so `fire` returns immediately. At most
//! one playback sounds at a time; `fire` while sounding is ignored and `stop`
//! cancels the active playback and kills its player process.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::process::Command;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chime_core::config::SoundConfig;

use crate::tone;
use crate::traits::{Notifier, NotifyError};

/// Minimum spacing between player launches, so a player that exits
/// immediately does not spin.
const MIN_REPEAT: Duration = Duration::from_secs(1);

/// Player program and its leading arguments; the WAV path is appended.
#[derive(Debug, Clone)]
struct PlayerCommand {
    program: String,
    args: Vec<String>,
}

impl PlayerCommand {
    fn parse(line: &str) -> Result<Self, NotifyError> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| NotifyError::Config("player command is empty".into()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

struct Playback {
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct PlaybackSlot {
    current: Option<Playback>,
    generation: u64,
}

pub struct AudioNotifier {
    player: PlayerCommand,
    duration: Duration,
    sample_rate: u32,
    slot: Arc<Mutex<PlaybackSlot>>,
}

impl AudioNotifier {
    pub fn new(config: &SoundConfig) -> Result<Self, NotifyError> {
        Ok(Self {
            player: PlayerCommand::parse(&config.player)?,
            duration: config.duration(),
            sample_rate: config.sample_rate,
            slot: Arc::new(Mutex::new(PlaybackSlot::default())),
        })
    }

    /// Render samples into a temporary WAV file removed when dropped.
    fn render(&self, samples: &[i16]) -> Result<NamedTempFile, NotifyError> {
        let mut file = tempfile::Builder::new()
            .prefix("chime-")
            .suffix(".wav")
            .tempfile()?;
        tone::write_wav(std::io::BufWriter::new(file.as_file_mut()), samples, self.sample_rate)?;
        Ok(file)
    }

    /// Play a one-second test tone and wait for the player to finish.
    pub async fn play_test_tone(&self) -> Result<(), NotifyError> {
        let file = self.render(&tone::simple_tone(self.sample_rate, 800.0, 1.0))?;
        let status = Command::new(&self.player.program)
            .args(&self.player.args)
            .arg(file.path())
            .status()
            .await
            .map_err(|e| NotifyError::Player {
                command: self.player.display(),
                reason: e.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(NotifyError::Player {
                command: self.player.display(),
                reason: format!("exited with {status}"),
            })
        }
    }
}

/// Replay `file` until `duration` elapses, the player fails, or `cancel` fires.
async fn play_loop(
    player: PlayerCommand,
    file: NamedTempFile,
    duration: Duration,
    cancel: CancellationToken,
) {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline && !cancel.is_cancelled() {
        let started = Instant::now();
        let mut child = match Command::new(&player.program)
            .args(&player.args)
            .arg(file.path())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %player.display(), error = %e, "failed to start alarm player");
                return;
            }
        };

        let exited = tokio::select! {
            _ = cancel.cancelled() => None,
            _ = tokio::time::sleep_until(deadline) => None,
            status = child.wait() => Some(status),
        };
        match exited {
            None => {
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "alarm player already exited");
                }
                return;
            }
            Some(Ok(status)) if status.success() => {}
            Some(Ok(status)) => {
                warn!(command = %player.display(), %status, "alarm player exited with failure");
                return;
            }
            Some(Err(e)) => {
                warn!(command = %player.display(), error = %e, "failed waiting for alarm player");
                return;
            }
        }

        let elapsed = started.elapsed();
        if elapsed < MIN_REPEAT {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(MIN_REPEAT - elapsed) => {}
            }
        }
    }
}

#[async_trait::async_trait]
impl Notifier for AudioNotifier {
    async fn fire(&self, alarm_name: &str) -> Result<(), NotifyError> {
        let (generation, cancel) = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            if slot.current.is_some() {
                debug!(alarm = alarm_name, "alarm already sounding, not stacking another");
                return Ok(());
            }
            slot.generation += 1;
            let cancel = CancellationToken::new();
            slot.current = Some(Playback {
                generation: slot.generation,
                cancel: cancel.clone(),
            });
            (slot.generation, cancel)
        };

        let file = match self.render(&tone::alarm_pattern(self.sample_rate)) {
            Ok(file) => file,
            Err(e) => {
                release(&self.slot, generation);
                return Err(e);
            }
        };

        info!(alarm = alarm_name, command = %self.player.display(), "sounding alarm");
        let slot = Arc::clone(&self.slot);
        let player = self.player.clone();
        let duration = self.duration;
        tokio::spawn(async move {
            play_loop(player, file, duration, cancel).await;
            release(&slot, generation);
        });
        Ok(())
    }

    async fn stop(&self) {
        let playback = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.current.take()
        };
        if let Some(playback) = playback {
            info!("stopping alarm sound");
            playback.cancel.cancel();
        }
    }

    fn is_sounding(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.current.is_some()
    }

    fn channel_name(&self) -> &str {
        "audio"
    }
}

/// Clear the slot if it still belongs to `generation`.
fn release(slot: &Mutex<PlaybackSlot>, generation: u64) {
    let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
    if slot
        .current
        .as_ref()
        .is_some_and(|p| p.generation == generation)
    {
        slot.current = None;
    }
}
