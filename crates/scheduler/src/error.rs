use chime_storage::StoreError;
use thiserror::Error;

/// A failure that aborts the current tick. The loop logs it, backs off and
/// carries on.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("alarm store error: {0}")]
    Store(#[from] StoreError),
}
