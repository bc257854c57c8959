//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::page::Page;
use super::protocol::{BrowserVersion, CdpEvent, CdpMessage, CdpRequest, PageTarget};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Round-trip budget for a single CDP command.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

struct PendingRequest {
    tx: oneshot::Sender<Result<Value, CdpError>>,
}

/// Connection state shared between the client, the attached page and the
/// receive task.
pub(crate) struct Transport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    pending: Mutex<HashMap<u64, PendingRequest>>,
    next_id: AtomicU64,
    event_routes: Mutex<HashMap<String, mpsc::UnboundedSender<CdpEvent>>>,
}

impl Transport {
    /// Sends a command and waits for its reply.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };
        let payload = serde_json::to_string(&request)?;
        trace!(%payload, "cdp send");

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(payload.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("{method} did not answer")))
            }
        }
    }
}

/// Client owning the WebSocket connection to one browser.
pub struct CdpClient {
    http_endpoint: String,
    transport: Arc<Transport>,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a browser debugging endpoint, e.g. `http://localhost:9222`.
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();

        let version_url = format!("{http_endpoint}/json/version");
        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::BrowserUnreachable(format!("{http_endpoint}: {e}")))?
            .json()
            .await
            .map_err(|e| CdpError::BrowserUnreachable(format!("{http_endpoint}: {e}")))?;

        debug!(browser = %version.browser, "discovered browser endpoint");

        let (ws_stream, _) =
            tokio_tungstenite::connect_async(version.web_socket_debugger_url.as_str())
                .await
                .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {e}")))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let transport = Arc::new(Transport {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            event_routes: Mutex::new(HashMap::new()),
        });

        let recv_task = tokio::spawn(Self::receive_loop(ws_source, transport.clone()));

        debug!(url = %version.web_socket_debugger_url, "cdp connected");
        Ok(Self {
            http_endpoint,
            transport,
            recv_task,
        })
    }

    /// Routes replies to waiting callers and events to their session.
    async fn receive_loop(mut source: WsSource, transport: Arc<Transport>) {
        while let Some(msg) = source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!(payload = %text, "cdp recv");
                    let parsed: CdpMessage = match serde_json::from_str(&text) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            warn!(error = %e, "unparseable cdp message");
                            continue;
                        }
                    };

                    if let Some(id) = parsed.id {
                        if let Some(request) = transport.pending.lock().remove(&id) {
                            let result = match parsed.error {
                                Some(error) => Err(CdpError::Protocol {
                                    code: error.code,
                                    message: error.message,
                                }),
                                None => Ok(parsed.result.unwrap_or(Value::Null)),
                            };
                            let _ = request.tx.send(result);
                        }
                    } else if let Some(method) = parsed.method {
                        let session = parsed.session_id.unwrap_or_default();
                        let routes = transport.event_routes.lock();
                        if let Some(tx) = routes.get(&session) {
                            let _ = tx.send(CdpEvent {
                                method,
                                params: parsed.params.unwrap_or(Value::Null),
                            });
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("cdp websocket closed");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "cdp websocket error");
                    break;
                }
                _ => {}
            }
        }

        // Nothing will answer once the socket is gone.
        for (_, request) in transport.pending.lock().drain() {
            let _ = request.tx.send(Err(CdpError::SessionClosed));
        }
    }

    /// Attach to the browser's initial page target.
    ///
    /// A freshly launched headless browser exposes exactly one `about:blank`
    /// page; this run drives that page rather than opening tabs.
    pub async fn attach_first_page(&self) -> Result<Page, CdpError> {
        let list_url = format!("{}/json/list", self.http_endpoint);
        let targets: Vec<PageTarget> = reqwest::get(&list_url).await?.json().await?;
        let target = targets
            .into_iter()
            .find(|t| t.target_type == "page")
            .ok_or_else(|| CdpError::InvalidResponse("no page target available".to_string()))?;

        let result = self
            .transport
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target.id, "flatten": true})),
                None,
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.transport
            .event_routes
            .lock()
            .insert(session_id.clone(), event_tx);

        let page = Page::new(target.id, session_id, self.transport.clone(), event_rx);
        page.enable_domains().await?;
        Ok(page)
    }

    /// Close a page's target and stop routing its events.
    pub async fn close_page(&self, page: &Page) -> Result<(), CdpError> {
        self.transport
            .call(
                "Target.closeTarget",
                Some(json!({"targetId": page.target_id()})),
                None,
            )
            .await?;
        self.transport.event_routes.lock().remove(page.session_id());
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
