//! Traits the capture and delivery crates implement.

use std::path::Path;

use async_trait::async_trait;

/// Boxed error type crossing the trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a capture attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The artifact was written to the requested path.
    Captured,
    /// The target element lost its layout between the wait and the
    /// screenshot; nothing was written and delivery must be skipped.
    ElementMissing,
}

/// Produces the screenshot artifact.
#[async_trait]
pub trait Capturer: Send + Sync {
    /// Render the page and write the element screenshot to `artifact`.
    async fn capture(&self, artifact: &Path) -> Result<CaptureOutcome, BoxError>;
}

/// Uploads the screenshot artifact.
#[async_trait]
pub trait Deliverer: Send + Sync {
    /// Send the artifact to the configured channel.
    async fn deliver(&self, artifact: &Path) -> Result<(), BoxError>;
}
