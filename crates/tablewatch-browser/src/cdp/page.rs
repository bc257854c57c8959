//! Attached page session: navigation, waits, DOM queries, screenshots.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::client::Transport;
use super::error::CdpError;
use super::protocol::{BoxModel, CdpEvent, ScreenshotFormat, Viewport};

/// Interval between readyState and selector polls.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The page counts as network-idle when at most this many requests are in
/// flight...
const IDLE_MAX_INFLIGHT: usize = 2;

/// ...continuously for this long.
const IDLE_QUIET: Duration = Duration::from_millis(500);

/// A session attached to a single page target.
pub struct Page {
    target_id: String,
    session_id: String,
    transport: Arc<Transport>,
    /// Network events for this session, drained by [`Page::wait_until_idle`].
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<CdpEvent>>,
}

impl Page {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        transport: Arc<Transport>,
        events: mpsc::UnboundedReceiver<CdpEvent>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            transport,
            events: tokio::sync::Mutex::new(events),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command scoped to this page.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Enable the domains the capture flow relies on. Network events start
    /// flowing from here, which is what the idle wait consumes.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;
        debug!(session = %self.session_id, "enabled cdp domains");
        Ok(())
    }

    /// Fix the rendering viewport so output quality does not depend on the
    /// host display.
    pub async fn set_device_metrics(
        &self,
        width: u32,
        height: u32,
        scale: f64,
    ) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": scale,
                "mobile": false,
            })),
        )
        .await?;
        Ok(())
    }

    /// Start navigating to `url`. Completion is a separate concern; callers
    /// follow up with [`Page::wait_until_idle`].
    pub async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        let result = self.call("Page.navigate", Some(json!({"url": url}))).await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(CdpError::NavigationFailed(error.to_string()));
            }
        }

        debug!(url, "navigation started");
        Ok(())
    }

    /// Wait until the document has loaded and network activity has settled:
    /// at most [`IDLE_MAX_INFLIGHT`] requests in flight, sustained for
    /// [`IDLE_QUIET`]. Fails with [`CdpError::Timeout`] on expiry.
    pub async fn wait_until_idle(&self, timeout: Duration) -> Result<(), CdpError> {
        let deadline = Instant::now() + timeout;

        loop {
            let state = self.evaluate("document.readyState").await?;
            if matches!(state.as_str(), Some("complete" | "interactive")) {
                break;
            }
            if Instant::now() >= deadline {
                return Err(CdpError::Timeout("document never finished loading".to_string()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        let mut events = self.events.lock().await;
        let mut inflight: HashSet<String> = HashSet::new();
        let mut settled_at = Some(Instant::now());

        loop {
            if let Some(since) = settled_at {
                if since.elapsed() >= IDLE_QUIET {
                    debug!("network idle");
                    return Ok(());
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(CdpError::Timeout("network never went idle".to_string()));
            }
            let wait = match settled_at {
                Some(since) => (IDLE_QUIET.saturating_sub(since.elapsed())).min(deadline - now),
                None => deadline - now,
            };

            match tokio::time::timeout(wait, events.recv()).await {
                Ok(Some(event)) => {
                    Self::track_request(&event, &mut inflight);
                    trace!(method = %event.method, inflight = inflight.len(), "network event");
                    if inflight.len() > IDLE_MAX_INFLIGHT {
                        settled_at = None;
                    } else if settled_at.is_none() {
                        settled_at = Some(Instant::now());
                    }
                }
                Ok(None) => return Err(CdpError::SessionClosed),
                // No event inside the window; loop around to re-check the
                // quiet period and the deadline.
                Err(_) => {}
            }
        }
    }

    fn track_request(event: &CdpEvent, inflight: &mut HashSet<String>) {
        let Some(request_id) = event.params["requestId"].as_str() else {
            return;
        };
        match event.method.as_str() {
            "Network.requestWillBeSent" => {
                inflight.insert(request_id.to_string());
            }
            "Network.loadingFinished" | "Network.loadingFailed" => {
                inflight.remove(request_id);
            }
            _ => {}
        }
    }

    /// Evaluate a JavaScript expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Query a selector against the current document. `None` when nothing
    /// matches.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>, CdpError> {
        let document = self.call("DOM.getDocument", Some(json!({"depth": 0}))).await?;
        let root_id = document["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("document without root".to_string()))?;

        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({"nodeId": root_id, "selector": selector})),
            )
            .await?;

        match result["nodeId"].as_i64() {
            Some(0) | None => Ok(None),
            Some(node_id) => Ok(Some(node_id)),
        }
    }

    /// Poll for a selector until it matches or `timeout` expires.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<i64, CdpError> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(node_id) = self.query_selector(selector).await? {
                return Ok(node_id);
            }
            if Instant::now() >= deadline {
                return Err(CdpError::Timeout(format!(
                    "waiting for selector '{selector}' timed out"
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Box model for a node; `None` when the node has no layout.
    pub async fn get_box_model(&self, node_id: i64) -> Result<Option<BoxModel>, CdpError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"nodeId": node_id})))
            .await;

        match result {
            Ok(value) => {
                let model: BoxModel = serde_json::from_value(value["model"].clone())?;
                Ok(Some(model))
            }
            // -32000: node is not rendered
            Err(CdpError::Protocol { code: -32000, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Scroll a node into the viewport if it is outside it.
    pub async fn scroll_into_view(&self, node_id: i64) -> Result<(), CdpError> {
        self.call(
            "DOM.scrollIntoViewIfNeeded",
            Some(json!({"nodeId": node_id})),
        )
        .await?;
        Ok(())
    }

    /// Synthesize a left click at page coordinates.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        for event_type in ["mousePressed", "mouseReleased"] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": "left",
                    "clickCount": 1,
                })),
            )
            .await?;
        }
        debug!(x, y, "clicked");
        Ok(())
    }

    /// Click the center of the element matching `selector`.
    pub async fn click_selector(&self, selector: &str) -> Result<(), CdpError> {
        let node_id = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;

        let model = self
            .get_box_model(node_id)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(format!("{selector} (not visible)")))?;

        let (x, y) = quad_center(&model.content);
        self.click(x, y).await
    }

    /// Capture a screenshot, optionally clipped, and return the decoded
    /// image bytes.
    pub async fn screenshot(
        &self,
        format: ScreenshotFormat,
        clip: Option<Viewport>,
    ) -> Result<Vec<u8>, CdpError> {
        let mut params = json!({
            "format": format,
            "captureBeyondViewport": clip.is_some(),
        });
        if let Some(clip) = clip {
            params["clip"] = serde_json::to_value(clip)?;
        }

        let result = self.call("Page.captureScreenshot", Some(params)).await?;
        let data = result["data"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("missing screenshot data".to_string()))?;

        BASE64
            .decode(data)
            .map_err(|e| CdpError::InvalidResponse(format!("screenshot payload: {e}")))
    }
}

/// Center point of an 8-element content quad.
fn quad_center(quad: &[f64]) -> (f64, f64) {
    if quad.len() >= 8 {
        let x = (quad[0] + quad[2] + quad[4] + quad[6]) / 4.0;
        let y = (quad[1] + quad[3] + quad[5] + quad[7]) / 4.0;
        (x, y)
    } else {
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_center_of_rectangle() {
        let quad = [0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0];
        assert_eq!(quad_center(&quad), (50.0, 50.0));
    }

    #[test]
    fn quad_center_of_short_slice_is_origin() {
        assert_eq!(quad_center(&[1.0, 2.0]), (0.0, 0.0));
    }

    #[test]
    fn track_request_counts_inflight() {
        let mut inflight = HashSet::new();
        let start = CdpEvent {
            method: "Network.requestWillBeSent".to_string(),
            params: json!({"requestId": "R1"}),
        };
        let finish = CdpEvent {
            method: "Network.loadingFinished".to_string(),
            params: json!({"requestId": "R1"}),
        };

        Page::track_request(&start, &mut inflight);
        assert_eq!(inflight.len(), 1);
        Page::track_request(&finish, &mut inflight);
        assert!(inflight.is_empty());
    }

    #[test]
    fn track_request_ignores_unrelated_events() {
        let mut inflight = HashSet::new();
        let event = CdpEvent {
            method: "Page.frameNavigated".to_string(),
            params: json!({"frame": {"id": "F1"}}),
        };
        Page::track_request(&event, &mut inflight);
        assert!(inflight.is_empty());
    }

    #[test]
    fn failed_loads_leave_the_wire_quiet() {
        let mut inflight = HashSet::new();
        Page::track_request(
            &CdpEvent {
                method: "Network.requestWillBeSent".to_string(),
                params: json!({"requestId": "R2"}),
            },
            &mut inflight,
        );
        Page::track_request(
            &CdpEvent {
                method: "Network.loadingFailed".to_string(),
                params: json!({"requestId": "R2"}),
            },
            &mut inflight,
        );
        assert!(inflight.is_empty());
    }
}
