use std::path::PathBuf;

use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tablewatch_core::Deliverer;

use super::*;

fn client_for(server: &MockServer, chat_id: &str) -> TelegramClient {
    let mut config = TelegramConfig::new("123:abc".to_string(), chat_id.to_string());
    config.api_base = server.uri();
    TelegramClient::new(config).unwrap()
}

fn artifact_in(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("standings.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nfake image bytes").unwrap();
    path
}

#[tokio::test]
async fn upload_hits_send_photo_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendPhoto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"message_id": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let artifact = artifact_in(&dir);

    client_for(&server, "-1001234")
        .send_photo(&artifact, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn multipart_body_carries_chat_id_and_photo() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
        )
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let artifact = artifact_in(&dir);

    client_for(&server, "-1001234")
        .send_photo(&artifact, Some("League table - 2024-05-01"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="chat_id""#));
    assert!(body.contains("-1001234"));
    assert!(body.contains(r#"name="photo""#));
    assert!(body.contains(r#"filename="standings.png""#));
    assert!(body.contains(r#"name="caption""#));
    assert!(body.contains("League table - 2024-05-01"));
}

#[tokio::test]
async fn provider_refusal_is_a_rejected_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Bad Request: chat not found",
            "error_code": 400
        })))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let artifact = artifact_in(&dir);

    let err = client_for(&server, "nope")
        .send_photo(&artifact, None)
        .await
        .unwrap_err();

    match err {
        DeliveryError::Rejected {
            description,
            error_code,
        } => {
            assert!(description.contains("chat not found"));
            assert_eq!(error_code, Some(400));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn ok_false_without_description_still_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": false})),
        )
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let artifact = artifact_in(&dir);

    let err = client_for(&server, "-1")
        .send_photo(&artifact, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Rejected { .. }));
}

#[tokio::test]
async fn non_json_reply_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let artifact = artifact_in(&dir);

    let err = client_for(&server, "-1")
        .send_photo(&artifact, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)));
}

#[tokio::test]
async fn missing_artifact_makes_no_http_call() {
    let server = MockServer::start().await;

    let dir = tempdir().unwrap();
    let err = client_for(&server, "-1")
        .send_photo(&dir.path().join("never-written.png"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::Artifact { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_proxy_fails_at_construction() {
    let mut config = TelegramConfig::new("123:abc".to_string(), "-1".to_string());
    config.proxy = Some("definitely not a url".to_string());
    assert!(matches!(
        TelegramClient::new(config),
        Err(DeliveryError::Client(_))
    ));
}

#[tokio::test]
async fn deliverer_trait_attaches_a_dated_caption() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
        )
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let artifact = artifact_in(&dir);

    client_for(&server, "-1").deliver(&artifact).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="caption""#));
    assert!(body.contains("League table -"));
}
