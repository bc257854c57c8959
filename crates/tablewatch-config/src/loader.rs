//! Environment loading and validation.

use std::path::PathBuf;

use url::Url;

use crate::error::ConfigError;
use crate::schema::{Config, DEFAULT_ARTIFACT_FILE, DEFAULT_LOG_FILE, DEFAULT_MARKER};

const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const ENV_CHAT_ID: &str = "TELEGRAM_CHANNEL_ID";
const ENV_LOG_FILE: &str = "TABLEWATCH_LOG_FILE";
const ENV_MARKER: &str = "TABLEWATCH_MARKER";
const ENV_ARTIFACT_FILE: &str = "TABLEWATCH_ARTIFACT_FILE";
const ENV_PAGE_URL: &str = "TABLEWATCH_PAGE_URL";

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// Empty values count as unset, matching how a blank line in a dotenv
    /// file behaves.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let require = |key: &str| {
            get(key).ok_or_else(|| ConfigError::EnvVarNotSet(key.to_string()))
        };

        Ok(Config {
            log_path: get(ENV_LOG_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            marker: get(ENV_MARKER).unwrap_or_else(|| DEFAULT_MARKER.to_string()),
            artifact_path: get(ENV_ARTIFACT_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_FILE)),
            page_url: get(ENV_PAGE_URL),
            bot_token: require(ENV_BOT_TOKEN)?,
            chat_id: require(ENV_CHAT_ID)?,
            proxy: None,
        })
    }
}

/// Validates a proxy URL for the delivery client.
///
/// Accepted schemes are `http`, `https` and `socks5`; a hostname is
/// required.
pub fn validate_proxy_url(proxy: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(proxy).map_err(|e| ConfigError::InvalidValue {
        field: "proxy".to_string(),
        message: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" | "socks5" => {}
        other => {
            return Err(ConfigError::InvalidValue {
                field: "proxy".to_string(),
                message: format!("unsupported proxy scheme: {other}"),
            });
        }
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            field: "proxy".to_string(),
            message: "missing hostname or IP address in proxy URL".to_string(),
        });
    }

    Ok(())
}
