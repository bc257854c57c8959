//! The table capture flow.

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use tablewatch_core::{BoxError, CaptureOutcome, Capturer};

use crate::cdp::{CdpClient, CdpError, Page, ScreenshotFormat, Viewport};
use crate::chrome::{Chrome, ChromeConfig};
use crate::error::CaptureError;

/// Rendering viewport settings.
#[derive(Debug, Clone)]
pub struct ViewportSettings {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

/// Everything the capture flow needs to know about the target page.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Standings page to render.
    pub page_url: String,
    /// Consent button dismissed before the table wait.
    pub cookie_selector: String,
    /// Wrapper element the screenshot is clipped to.
    pub table_selector: String,
    pub viewport: ViewportSettings,
    /// Budget for navigation plus network settling.
    pub navigation_timeout: Duration,
    /// Budget for the table selector to appear.
    pub element_timeout: Duration,
    /// Budget for the cookie banner; expiry is not an error.
    pub cookie_timeout: Duration,
    pub chrome: ChromeConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            page_url: "https://www.bbc.com/sport/football/spanish-la-liga/table".to_string(),
            cookie_selector: r#"button[data-testid="accept-button"]"#.to_string(),
            table_selector: ".ssrcss-1dbj4ao-TableWrapper".to_string(),
            viewport: ViewportSettings {
                width: 1920,
                height: 1080,
                scale: 2.0,
            },
            navigation_timeout: Duration::from_secs(30),
            element_timeout: Duration::from_secs(30),
            cookie_timeout: Duration::from_secs(5),
            chrome: ChromeConfig::default(),
        }
    }
}

/// Captures the league table as a PNG artifact.
pub struct TableCapture {
    config: CaptureConfig,
}

impl TableCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Render the page and write the table screenshot to `artifact`.
    ///
    /// The browser is released before this returns, whatever happened.
    pub async fn capture_to(&self, artifact: &Path) -> Result<CaptureOutcome, CaptureError> {
        let chrome = Chrome::acquire(&self.config.chrome).await?;
        let result = self.drive_page(chrome.endpoint(), artifact).await;
        chrome.shutdown().await;
        result
    }

    async fn drive_page(
        &self,
        endpoint: &str,
        artifact: &Path,
    ) -> Result<CaptureOutcome, CaptureError> {
        let client = CdpClient::connect(endpoint).await?;
        let page = client.attach_first_page().await?;

        let viewport = &self.config.viewport;
        page.set_device_metrics(viewport.width, viewport.height, viewport.scale)
            .await?;

        page.navigate(&self.config.page_url).await?;
        match page.wait_until_idle(self.config.navigation_timeout).await {
            Ok(()) => {}
            Err(CdpError::Timeout(reason)) => {
                return Err(CaptureError::NavigationTimeout {
                    url: self.config.page_url.clone(),
                    reason,
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.dismiss_cookie_banner(&page).await;

        let node_id = match page
            .wait_for_selector(&self.config.table_selector, self.config.element_timeout)
            .await
        {
            Ok(node_id) => node_id,
            Err(CdpError::Timeout(_)) => {
                return Err(CaptureError::ElementNotFound(
                    self.config.table_selector.clone(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = page.scroll_into_view(node_id).await {
            warn!(error = %e, "could not scroll table into view");
        }

        // The wait saw the node, but layout can still disappear under us
        // (consent overlays re-render the page). Skip delivery in that case.
        let Some(model) = page.get_box_model(node_id).await? else {
            warn!(selector = %self.config.table_selector, "table element lost its layout");
            let _ = client.close_page(&page).await;
            return Ok(CaptureOutcome::ElementMissing);
        };

        let clip = clip_from_quad(&model.content).ok_or_else(|| {
            CdpError::InvalidResponse("table content quad is malformed".to_string())
        })?;

        let image = page.screenshot(ScreenshotFormat::Png, Some(clip)).await?;
        std::fs::write(artifact, &image).map_err(|e| CaptureError::Artifact {
            path: artifact.to_path_buf(),
            source: e,
        })?;

        info!(
            artifact = %artifact.display(),
            bytes = image.len(),
            "table screenshot saved"
        );

        let _ = client.close_page(&page).await;
        Ok(CaptureOutcome::Captured)
    }

    /// Best-effort: a missing banner or a failed click never fails the run.
    async fn dismiss_cookie_banner(&self, page: &Page) {
        let selector = &self.config.cookie_selector;
        match page
            .wait_for_selector(selector, self.config.cookie_timeout)
            .await
        {
            Ok(_) => match page.click_selector(selector).await {
                Ok(()) => info!("cookie banner dismissed"),
                Err(e) => info!(error = %e, "cookie banner present but not dismissable"),
            },
            Err(_) => info!("no cookie banner found"),
        }
    }
}

/// Axis-aligned clip covering a content quad.
fn clip_from_quad(quad: &[f64]) -> Option<Viewport> {
    if quad.len() < 8 {
        return None;
    }
    let xs = [quad[0], quad[2], quad[4], quad[6]];
    let ys = [quad[1], quad[3], quad[5], quad[7]];
    let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let width = max_x - min_x;
    let height = max_y - min_y;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    Some(Viewport {
        x: min_x,
        y: min_y,
        width,
        height,
        scale: 1.0,
    })
}

#[async_trait]
impl Capturer for TableCapture {
    async fn capture(&self, artifact: &Path) -> Result<CaptureOutcome, BoxError> {
        Ok(self.capture_to(artifact).await?)
    }
}
