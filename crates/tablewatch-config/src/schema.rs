//! Configuration schema.

use std::path::PathBuf;

/// Runtime configuration, loaded once at startup.
///
/// `bot_token` and `chat_id` are required; everything else has a default or
/// is optional. The proxy is only settable through the CLI, mirroring how
/// the capture and delivery targets are wired by the binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trigger log scanned for the marker token.
    pub log_path: PathBuf,
    /// Substring that arms a run when present on any log line.
    pub marker: String,
    /// Where the screenshot is written between capture and delivery.
    pub artifact_path: PathBuf,
    /// Override for the standings page URL.
    pub page_url: Option<String>,
    /// Telegram bot credential.
    pub bot_token: String,
    /// Telegram chat or channel identifier.
    pub chat_id: String,
    /// Outbound proxy for delivery (http, https or socks5).
    pub proxy: Option<String>,
}

pub(crate) const DEFAULT_LOG_FILE: &str = "liga-table.log";
pub(crate) const DEFAULT_MARKER: &str = "LEAGUE";
pub(crate) const DEFAULT_ARTIFACT_FILE: &str = "league-standings.png";
