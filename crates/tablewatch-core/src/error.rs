//! Pipeline errors.

use thiserror::Error;

use crate::protocol::BoxError;

/// Errors that abort a watch run.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The trigger log could not be read.
    #[error("Trigger log unreadable: {0}")]
    TriggerLog(#[source] std::io::Error),

    /// Capture failed; the trigger log is left untouched so the run can be
    /// retried.
    #[error("Capture failed: {0}")]
    Capture(#[source] BoxError),

    /// Artifact deletion or log truncation failed.
    #[error("State reset failed: {0}")]
    Reset(#[source] std::io::Error),
}
