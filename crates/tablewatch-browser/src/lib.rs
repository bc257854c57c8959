//! Headless page capture for tablewatch.
//!
//! Drives a Chromium instance over the Chrome DevTools Protocol (CDP):
//!
//! ```text
//! ┌────────────────┐    WebSocket     ┌──────────────────┐
//! │  tablewatch    │ ◄──────────────► │ headless Chromium│
//! │  (this crate)  │       CDP        │ (spawned per run)│
//! └────────────────┘                  └──────────────────┘
//! ```
//!
//! The crate spawns its own browser process with a remote-debugging port,
//! attaches to the initial page target, renders the standings page at a
//! fixed high-resolution viewport and writes an element-clipped PNG. The
//! browser is torn down on every exit path: explicitly on the normal path,
//! and via `kill_on_drop` when the task unwinds.

pub mod cdp;

mod capture;
mod chrome;
mod error;

pub use capture::{CaptureConfig, TableCapture, ViewportSettings};
pub use chrome::{Chrome, ChromeConfig};
pub use error::CaptureError;
