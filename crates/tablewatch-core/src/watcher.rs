//! The watch run: Idle -> Capturing -> Delivering -> Resetting -> Idle.

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::error::WatchError;
use crate::protocol::{CaptureOutcome, Capturer, Deliverer};
use crate::{reset, trigger};

/// Terminal state of a single watch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No marker line in the trigger log; nothing ran.
    Skipped,
    /// Capture succeeded, the artifact was delivered, state was reset.
    Delivered,
    /// Capture succeeded but the provider refused the upload or the
    /// transport failed; state was reset anyway.
    DeliveryFailed,
    /// The element vanished before the screenshot; nothing was delivered,
    /// state was reset.
    NothingCaptured,
}

/// Drives one watch run over a capturer and a deliverer.
pub struct Watcher<C, D> {
    log_path: PathBuf,
    marker: String,
    artifact_path: PathBuf,
    capturer: C,
    deliverer: D,
}

impl<C: Capturer, D: Deliverer> Watcher<C, D> {
    pub fn new(
        log_path: PathBuf,
        marker: String,
        artifact_path: PathBuf,
        capturer: C,
        deliverer: D,
    ) -> Self {
        Self {
            log_path,
            marker,
            artifact_path,
            capturer,
            deliverer,
        }
    }

    /// Runs the pipeline once.
    ///
    /// Capture failures propagate without resetting the log, so the marker
    /// stays armed for the next invocation. Once capture has succeeded the
    /// reset step always runs, even when delivery failed.
    pub async fn run(&self) -> Result<RunOutcome, WatchError> {
        if !trigger::marker_present(&self.log_path, &self.marker)
            .map_err(WatchError::TriggerLog)?
        {
            info!(marker = %self.marker, "no marker entry in trigger log, exiting");
            return Ok(RunOutcome::Skipped);
        }

        info!(marker = %self.marker, "trigger armed, starting capture");
        let outcome = self
            .capturer
            .capture(&self.artifact_path)
            .await
            .map_err(WatchError::Capture)?;

        let run = match outcome {
            CaptureOutcome::ElementMissing => {
                warn!("table element unavailable at screenshot time, skipping delivery");
                RunOutcome::NothingCaptured
            }
            CaptureOutcome::Captured => match self.deliverer.deliver(&self.artifact_path).await {
                Ok(()) => {
                    info!(artifact = %self.artifact_path.display(), "artifact delivered");
                    RunOutcome::Delivered
                }
                Err(e) => {
                    error!(error = %e, "delivery failed");
                    RunOutcome::DeliveryFailed
                }
            },
        };

        reset::reset_state(&self.artifact_path, &self.log_path).map_err(WatchError::Reset)?;
        Ok(run)
    }
}
