//! Bot API client.

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;
use tokio_util::io::ReaderStream;
use tracing::info;

use tablewatch_core::{BoxError, Deliverer};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivery settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot credential, the `<token>` in `/bot<token>/sendPhoto`.
    pub bot_token: String,
    /// Chat or channel the photo is addressed to.
    pub chat_id: String,
    /// Optional outbound proxy (http, https or socks5).
    pub proxy: Option<String>,
    /// API base, overridable for tests.
    pub api_base: String,
}

impl TelegramConfig {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            proxy: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Errors raised while uploading the artifact.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The provider answered but refused the upload.
    #[error("Telegram rejected the upload: {description}")]
    Rejected {
        description: String,
        error_code: Option<i64>,
    },

    /// The request never produced a parseable provider reply.
    #[error("Transport error talking to Telegram: {0}")]
    Transport(String),

    /// The artifact could not be opened for streaming.
    #[error("Could not read artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built.
    #[error("Invalid delivery configuration: {0}")]
    Client(String),
}

/// Reply envelope shared by all Bot API methods.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

/// Uploads capture artifacts via the Bot API.
pub struct TelegramClient {
    http: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, DeliveryError> {
        let mut builder = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| DeliveryError::Client(format!("proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Upload a photo file to the configured chat.
    pub async fn send_photo(
        &self,
        photo: &Path,
        caption: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let file = tokio::fs::File::open(photo)
            .await
            .map_err(|e| DeliveryError::Artifact {
                path: photo.to_path_buf(),
                source: e,
            })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| DeliveryError::Artifact {
                path: photo.to_path_buf(),
                source: e,
            })?
            .len();

        let file_name = photo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.png".to_string());

        let stream = ReaderStream::new(file);
        let part = multipart::Part::stream_with_length(reqwest::Body::wrap_stream(stream), length)
            .file_name(file_name)
            .mime_str("image/png")
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        let mut form = multipart::Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .part("photo", part);
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }

        let url = format!(
            "{}/bot{}/sendPhoto",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        );

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let reply: ApiReply = response
            .json()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if !reply.ok {
            return Err(DeliveryError::Rejected {
                description: reply
                    .description
                    .unwrap_or_else(|| "no description in reply".to_string()),
                error_code: reply.error_code,
            });
        }

        info!(chat_id = %self.config.chat_id, "photo accepted by Telegram");
        Ok(())
    }
}

#[async_trait]
impl Deliverer for TelegramClient {
    async fn deliver(&self, artifact: &Path) -> Result<(), BoxError> {
        let caption = format!(
            "League table - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M")
        );
        self.send_photo(artifact, Some(&caption)).await?;
        Ok(())
    }
}
