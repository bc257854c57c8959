//! Chrome DevTools Protocol transport.
//!
//! One WebSocket connection to the browser, one attached page session. A
//! background task routes command replies to their callers by request id
//! and forwards page events (network activity) to the session that owns
//! them.

mod client;
mod error;
mod page;
mod protocol;

pub use client::CdpClient;
pub use error::CdpError;
pub use page::Page;
pub use protocol::{BoxModel, CdpEvent, ScreenshotFormat, Viewport};
