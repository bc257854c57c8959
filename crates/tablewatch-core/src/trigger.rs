//! Trigger gate: scans the watch log for the marker token.

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;

use std::io;
use std::path::Path;

use tracing::debug;

/// Returns whether any line of the trigger log contains the marker token.
///
/// The log must be readable; a missing file is an error, not an idle run.
pub fn marker_present(log_path: &Path, marker: &str) -> io::Result<bool> {
    let contents = std::fs::read_to_string(log_path)?;
    let armed = contents.lines().any(|line| line.contains(marker));
    debug!(log = %log_path.display(), marker, armed, "scanned trigger log");
    Ok(armed)
}
