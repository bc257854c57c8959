//! Capture errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::cdp::CdpError;

/// Errors raised while producing the screenshot artifact.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No Chromium executable on this host.
    #[error("No Chromium executable found. Install Google Chrome or Chromium.")]
    ChromeNotFound,

    /// The browser process would not start or never became reachable.
    #[error("Failed to launch Chromium: {0}")]
    LaunchFailed(String),

    /// The page never settled inside the navigation budget.
    #[error("Navigation to {url} timed out: {reason}")]
    NavigationTimeout { url: String, reason: String },

    /// The table selector never matched.
    #[error("Table element never appeared: {0}")]
    ElementNotFound(String),

    /// Writing the screenshot to disk failed.
    #[error("Could not write artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport or protocol failure underneath.
    #[error(transparent)]
    Cdp(#[from] CdpError),
}
