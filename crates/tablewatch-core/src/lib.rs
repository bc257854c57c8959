//! Core pipeline for tablewatch.
//!
//! The pipeline runs four steps strictly in sequence:
//!
//! 1. Trigger gate - scan the watch log for the marker token; without it the
//!    run is a no-op.
//! 2. Capture - produce the screenshot artifact (behind the [`Capturer`]
//!    trait; the browser crate provides the real implementation).
//! 3. Delivery - upload the artifact (behind the [`Deliverer`] trait).
//! 4. Reset - delete the artifact and truncate the watch log.
//!
//! A capture failure aborts the run before the log is touched, so the next
//! invocation retries. A delivery failure is reported but does not stop the
//! reset step.

mod error;
mod protocol;
mod reset;
mod trigger;
mod watcher;

pub use error::WatchError;
pub use protocol::{BoxError, CaptureOutcome, Capturer, Deliverer};
pub use reset::reset_state;
pub use trigger::marker_present;
pub use watcher::{RunOutcome, Watcher};
