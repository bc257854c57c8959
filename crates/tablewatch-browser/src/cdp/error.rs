//! CDP error types.

use thiserror::Error;

/// CDP transport and protocol errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to establish the WebSocket connection.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The debugging endpoint did not answer.
    #[error("Browser not reachable at {0}")]
    BrowserUnreachable(String),

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error reply from the browser.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error during endpoint discovery.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation was refused by the browser.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// A selector matched nothing.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Script evaluation raised in the page.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// A bounded wait expired.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The connection went away under a pending request.
    #[error("Session closed")]
    SessionClosed,

    /// The browser answered with an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}
