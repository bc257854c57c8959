//! Chromium process lifecycle.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::error::CaptureError;

/// How long to poll the debugging endpoint after spawning.
const READY_ATTEMPTS: u32 = 30;
const READY_INTERVAL: Duration = Duration::from_millis(200);

/// Browser process settings.
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Remote debugging port.
    pub debug_port: u16,
    /// Run without a window.
    pub headless: bool,
    /// Explicit executable path; probed when unset.
    pub executable: Option<PathBuf>,
    /// Profile directory; a throwaway under the temp dir when unset.
    pub profile_dir: Option<PathBuf>,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            headless: true,
            executable: None,
            profile_dir: None,
        }
    }
}

impl ChromeConfig {
    /// Debugging endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    fn resolved_profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("tablewatch-profile"))
    }
}

/// A running browser reachable over its debugging endpoint.
///
/// When this struct spawned the process it also owns it: `shutdown` kills
/// it, and `kill_on_drop` covers unwind paths. An already-running browser
/// on the configured port is reused and left alone on shutdown.
pub struct Chrome {
    child: Option<Child>,
    endpoint: String,
}

impl Chrome {
    /// Probe well-known install locations for a Chromium-family executable.
    pub fn find_executable() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let paths: [&str; 0] = [];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Launch a browser for this run, or reuse one already listening on the
    /// configured port.
    pub async fn acquire(config: &ChromeConfig) -> Result<Self, CaptureError> {
        let endpoint = config.endpoint();

        if Self::is_reachable(&endpoint).await {
            info!(endpoint, "reusing browser already on the debug port");
            return Ok(Self {
                child: None,
                endpoint,
            });
        }

        let executable = config
            .executable
            .clone()
            .or_else(Self::find_executable)
            .ok_or(CaptureError::ChromeNotFound)?;

        let profile_dir = config.resolved_profile_dir();
        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            return Err(CaptureError::LaunchFailed(format!(
                "profile dir {}: {e}",
                profile_dir.display()
            )));
        }

        info!(
            executable = %executable.display(),
            profile = %profile_dir.display(),
            "launching browser"
        );

        let mut cmd = Command::new(&executable);
        for arg in launch_args(config, &profile_dir) {
            cmd.arg(arg);
        }
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| CaptureError::LaunchFailed(e.to_string()))?;

        debug!(pid = ?child.id(), "browser spawned");

        for _ in 0..READY_ATTEMPTS {
            tokio::time::sleep(READY_INTERVAL).await;
            if Self::is_reachable(&endpoint).await {
                return Ok(Self {
                    child: Some(child),
                    endpoint,
                });
            }
        }

        Err(CaptureError::LaunchFailed(
            "browser never opened its debugging endpoint".to_string(),
        ))
    }

    async fn is_reachable(endpoint: &str) -> bool {
        reqwest::get(format!("{endpoint}/json/version")).await.is_ok()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Kill the browser if this run spawned it.
    pub async fn shutdown(mut self) {
        if let Some(mut child) = self.child.take() {
            info!("shutting browser down");
            let _ = child.kill().await;
        }
    }
}

fn launch_args(config: &ChromeConfig, profile_dir: &std::path::Path) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", config.debug_port),
        format!("--user-data-dir={}", profile_dir.display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-sync".to_string(),
        "--metrics-recording-only".to_string(),
        "--no-sandbox".to_string(),
        "--disable-setuid-sandbox".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }
    args.push("about:blank".to_string());
    args
}
