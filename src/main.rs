//! tablewatch - league-table watcher.
//!
//! Scans a trigger log for the marker token; when armed, captures the
//! standings table from the configured page with headless Chromium and
//! posts the screenshot to a Telegram channel, then clears the trigger.
//!
//! Every failure is logged and the process exits 0: the tool is meant to
//! run unattended from cron, and the trigger log - not the exit code - is
//! the retry signal.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tablewatch_browser::{CaptureConfig, ChromeConfig, TableCapture};
use tablewatch_config::{Config, validate_proxy_url};
use tablewatch_core::Watcher;
use tablewatch_telegram::{TelegramClient, TelegramConfig};

/// Tablewatch CLI.
#[derive(Parser)]
#[command(name = "tablewatch")]
#[command(about = "Captures a league standings table and posts it to Telegram")]
#[command(version)]
struct Cli {
    /// Dotenv file loaded before reading configuration
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Trigger log path (overrides TABLEWATCH_LOG_FILE)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Outbound proxy for the Telegram upload (http, https or socks5)
    #[arg(long)]
    proxy: Option<String>,

    /// Chromium remote-debugging port
    #[arg(long, default_value_t = 9222)]
    debug_port: u16,

    /// Run Chromium with a visible window
    #[arg(long)]
    no_headless: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Env file first: RUST_LOG may live there. Subscriber next, so the
    // load failure (if any) is reported through it.
    let env_file_issue = load_env_file(cli.env_file.as_deref());
    init_tracing();
    if let Some((path, e)) = env_file_issue {
        warn!(path = %path.display(), error = %e, "could not load env file");
    }

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration error");
            return Ok(());
        }
    };

    if let Some(log_file) = cli.log_file {
        config.log_path = log_file;
    }
    if let Some(proxy) = cli.proxy {
        if let Err(e) = validate_proxy_url(&proxy) {
            error!(error = %e, "configuration error");
            return Ok(());
        }
        config.proxy = Some(proxy);
    }

    if let Err(e) = run(config, cli.debug_port, !cli.no_headless).await {
        error!(error = %e, "run failed");
    }
    Ok(())
}

async fn run(config: Config, debug_port: u16, headless: bool) -> anyhow::Result<()> {
    let mut capture_config = CaptureConfig {
        chrome: ChromeConfig {
            debug_port,
            headless,
            ..ChromeConfig::default()
        },
        ..CaptureConfig::default()
    };
    if let Some(page_url) = &config.page_url {
        capture_config.page_url = page_url.clone();
    }

    let mut telegram_config = TelegramConfig::new(config.bot_token.clone(), config.chat_id.clone());
    telegram_config.proxy = config.proxy.clone();

    let watcher = Watcher::new(
        config.log_path,
        config.marker,
        config.artifact_path,
        TableCapture::new(capture_config),
        TelegramClient::new(telegram_config)?,
    );

    let outcome = watcher.run().await?;
    info!(?outcome, "watch run complete");
    Ok(())
}

/// Load a dotenv file: an explicit path must exist, the implicit `.env`
/// is optional. Returns the failure for the caller to report once the
/// subscriber is up.
fn load_env_file(path: Option<&std::path::Path>) -> Option<(PathBuf, dotenvy::Error)> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .err()
            .map(|e| (path.to_path_buf(), e)),
        None => {
            let _ = dotenvy::dotenv();
            None
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
