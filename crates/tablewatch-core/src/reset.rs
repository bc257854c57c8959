//! State reset: removes the artifact and truncates the trigger log.

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;

use std::io;
use std::path::Path;

use tracing::{debug, info};

/// Deletes the capture artifact if it exists and truncates the trigger log
/// to zero bytes.
///
/// Artifact deletion is idempotent: a file that is already gone (delivery
/// may have reported it missing) is skipped silently. Truncation re-arms
/// nothing; only an external append of the marker line starts another run.
pub fn reset_state(artifact: &Path, log_path: &Path) -> io::Result<()> {
    match std::fs::remove_file(artifact) {
        Ok(()) => info!(artifact = %artifact.display(), "removed capture artifact"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(artifact = %artifact.display(), "no artifact to remove");
        }
        Err(e) => return Err(e),
    }

    std::fs::write(log_path, "")?;
    info!(log = %log_path.display(), "trigger log cleared");
    Ok(())
}
