use super::*;

#[test]
fn request_omits_absent_fields() {
    let request = CdpRequest {
        id: 7,
        method: "Page.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&request).unwrap();
    assert_eq!(json, r#"{"id":7,"method":"Page.enable"}"#);
}

#[test]
fn request_renames_session_id() {
    let request = CdpRequest {
        id: 1,
        method: "DOM.getDocument".to_string(),
        params: Some(serde_json::json!({"depth": 0})),
        session_id: Some("sess-1".to_string()),
    };
    let json = serde_json::to_string(&request).unwrap();
    assert!(json.contains(r#""sessionId":"sess-1""#));
    assert!(json.contains(r#""depth":0"#));
}

#[test]
fn reply_message_parses() {
    let text = r#"{"id":3,"result":{"frameId":"F1"},"sessionId":"sess-1"}"#;
    let msg: CdpMessage = serde_json::from_str(text).unwrap();
    assert_eq!(msg.id, Some(3));
    assert!(msg.method.is_none());
    assert_eq!(msg.result.unwrap()["frameId"], "F1");
}

#[test]
fn error_reply_parses() {
    let text = r#"{"id":4,"error":{"code":-32000,"message":"Could not find node"}}"#;
    let msg: CdpMessage = serde_json::from_str(text).unwrap();
    let error = msg.error.unwrap();
    assert_eq!(error.code, -32000);
    assert!(error.message.contains("node"));
}

#[test]
fn event_message_parses() {
    let text = r#"{"method":"Network.loadingFinished","params":{"requestId":"R1"},"sessionId":"sess-1"}"#;
    let msg: CdpMessage = serde_json::from_str(text).unwrap();
    assert!(msg.id.is_none());
    assert_eq!(msg.method.as_deref(), Some("Network.loadingFinished"));
    assert_eq!(msg.params.unwrap()["requestId"], "R1");
}

#[test]
fn browser_version_uses_chrome_field_names() {
    let text = r#"{
        "Browser": "HeadlessChrome/125.0.0.0",
        "Protocol-Version": "1.3",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(text).unwrap();
    assert!(version.browser.starts_with("HeadlessChrome"));
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn page_target_parses_type_field() {
    let text = r#"[{"id":"T1","type":"page","title":"blank","url":"about:blank"}]"#;
    let targets: Vec<PageTarget> = serde_json::from_str(text).unwrap();
    assert_eq!(targets[0].target_type, "page");
    assert_eq!(targets[0].url, "about:blank");
}

#[test]
fn box_model_parses_camel_case() {
    let text = r#"{"content":[0.0,0.0,10.0,0.0,10.0,20.0,0.0,20.0],"padding":[],"border":[],"margin":[],"width":10,"height":20}"#;
    let model: BoxModel = serde_json::from_str(text).unwrap();
    assert_eq!(model.content.len(), 8);
    assert_eq!(model.width, 10);
}

#[test]
fn screenshot_format_serializes_lowercase() {
    assert_eq!(
        serde_json::to_value(ScreenshotFormat::Png).unwrap(),
        serde_json::json!("png")
    );
}

#[test]
fn viewport_serializes_all_fields() {
    let clip = Viewport {
        x: 1.0,
        y: 2.0,
        width: 3.0,
        height: 4.0,
        scale: 1.0,
    };
    let value = serde_json::to_value(&clip).unwrap();
    assert_eq!(value["x"], 1.0);
    assert_eq!(value["scale"], 1.0);
}
