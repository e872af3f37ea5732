//! The polling loop around [`AlarmScheduler::tick`].

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::core::AlarmScheduler;

/// Loop states. Ticks never overlap: the next one starts only after the
/// previous evaluation finished and the idle wait elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Evaluating,
    Idle { wait: Duration },
}

impl AlarmScheduler {
    /// Run until stopped.
    ///
    /// Sleeps `tick_interval` after a successful tick and `error_backoff`
    /// after a failed one. The stop signal is checked before every tick and
    /// interrupts the idle wait, never an evaluation in progress.
    pub async fn run(&mut self, tick_interval: Duration, error_backoff: Duration) {
        info!(
            store = self.store.backend_name(),
            notifier = self.notifier.channel_name(),
            tick_secs = tick_interval.as_secs_f64(),
            backoff_secs = error_backoff.as_secs_f64(),
            "alarm scheduler starting"
        );

        if let Err(e) = self.seed_from_history().await {
            warn!(error = %e, "could not restore today's firings from history");
        }

        let shutdown = self.shutdown.clone();
        let mut state = LoopState::Evaluating;
        loop {
            if shutdown.is_cancelled() {
                break;
            }
            state = match state {
                LoopState::Evaluating => match self.tick().await {
                    Ok(report) => {
                        if !report.is_quiet() {
                            info!(
                                minute = %report.minute,
                                fired = report.fired.len(),
                                abandoned = report.abandoned.len(),
                                malformed = report.malformed.len(),
                                notifier_failures = report.notifier_failures.len(),
                                "alarm check complete"
                            );
                        }
                        LoopState::Idle {
                            wait: tick_interval,
                        }
                    }
                    Err(e) => {
                        error!(
                            error = %e,
                            backoff_secs = error_backoff.as_secs_f64(),
                            "alarm check failed, backing off"
                        );
                        LoopState::Idle {
                            wait: error_backoff,
                        }
                    }
                },
                LoopState::Idle { wait } => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(wait) => LoopState::Evaluating,
                    }
                }
            };
        }

        info!("alarm scheduler stopped");
    }

    /// Move the scheduler onto its own task.
    pub fn spawn(mut self, tick_interval: Duration, error_backoff: Duration) -> SchedulerHandle {
        let shutdown = self.shutdown_token();
        let join = tokio::spawn(async move {
            self.run(tick_interval, error_backoff).await;
        });
        SchedulerHandle { shutdown, join }
    }
}

/// Handle to a scheduler running on a background task.
pub struct SchedulerHandle {
    shutdown: CancellationToken,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop to exit after its current tick.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to exit.
    pub async fn join(self) {
        if let Err(e) = self.join.await {
            error!(error = %e, "alarm scheduler task panicked");
        }
    }

    /// Stop and wait.
    pub async fn shutdown(self) {
        self.stop();
        self.join().await;
    }
}
