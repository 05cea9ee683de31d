use super::*;
use crate::batcher::tests::RecordingNotifier;
use crate::config::WebhookConfig;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a relay backed by a recording notifier
fn create_test_relay(notifier: Arc<RecordingNotifier>) -> Arc<LobbyRelay> {
    Arc::new(LobbyRelay::with_notifier(Config::default(), notifier))
}

fn router_for(relay: Arc<LobbyRelay>) -> Router {
    let config = relay.config.clone();
    create_router(relay, config)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_lobby_message_is_sent() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = router_for(create_test_relay(notifier.clone()));

    let response = app
        .oneshot(post_json(
            "/lobby-message",
            r#"{"player": "Alice", "message": "glhf"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({"status": "sent"}));
    assert_eq!(notifier.sent(), vec!["💬 **Alice:** glhf".to_string()]);
}

#[tokio::test]
async fn test_missing_message_is_rejected_without_sending() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = router_for(create_test_relay(notifier.clone()));

    let response = app
        .oneshot(post_json("/lobby-message", r#"{"player": "Alice"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({"error": "Invalid payload"})
    );
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_missing_player_is_rejected() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = router_for(create_test_relay(notifier.clone()));

    let response = app
        .oneshot(post_json("/lobby-message", r#"{"message": "hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_empty_fields_are_rejected() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = router_for(create_test_relay(notifier.clone()));

    let response = app
        .oneshot(post_json(
            "/lobby-message",
            r#"{"player": "", "message": "hi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let notifier = Arc::new(RecordingNotifier::default());
    let relay = create_test_relay(notifier.clone());

    for body in ["not json", "", r#"{"player": 5, "message": "hi"}"#] {
        let response = router_for(relay.clone())
            .oneshot(post_json("/lobby-message", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"error": "Invalid payload"})
        );
    }

    // Missing content-type
    let response = router_for(relay)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/lobby-message")
                .body(Body::from(r#"{"player": "A", "message": "b"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_send_failure_returns_500() {
    let notifier = Arc::new(RecordingNotifier::failing());
    let app = router_for(create_test_relay(notifier.clone()));

    let response = app
        .oneshot(post_json(
            "/lobby-message",
            r#"{"player": "Alice", "message": "hi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({"error": "Failed to send to Discord"})
    );
    assert_eq!(notifier.sent().len(), 1, "exactly one attempt, no retry");
}

#[tokio::test]
async fn test_unconfigured_webhook_returns_500() {
    let relay = Arc::new(LobbyRelay::new(Config::default()).unwrap());
    let app = router_for(relay);

    let response = app
        .oneshot(post_json(
            "/lobby-message",
            r#"{"player": "Alice", "message": "hi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({"error": "Failed to send to Discord"})
    );
}

#[tokio::test]
async fn test_relay_through_real_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/token"))
        .and(body_json(serde_json::json!({"content": "💬 **Bob:** nice shot"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.webhook = WebhookConfig {
        url: Some(format!("{}/api/webhooks/1/token", server.uri())),
        timeout: Duration::from_secs(5),
    };
    let relay = Arc::new(LobbyRelay::new(config).unwrap());

    let response = router_for(relay)
        .oneshot(post_json(
            "/lobby-message",
            r#"{"player": "Bob", "message": "nice shot"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let app = router_for(create_test_relay(Arc::new(RecordingNotifier::default())));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body, routes::LIVENESS_MESSAGE.as_bytes());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = router_for(create_test_relay(Arc::new(RecordingNotifier::default())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["feed_relay"], false);
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let app = router_for(create_test_relay(Arc::new(RecordingNotifier::default())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["paths"]["/lobby-message"].is_object());
}

#[tokio::test]
async fn test_get_on_relay_route_not_allowed() {
    let app = router_for(create_test_relay(Arc::new(RecordingNotifier::default())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/lobby-message")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_api_server_stops_on_shutdown() {
    let mut config = Config::default();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let relay = Arc::new(LobbyRelay::with_notifier(
        config,
        Arc::new(RecordingNotifier::default()),
    ));

    let api_handle = relay.spawn_api_server();

    // Give it a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    relay.shutdown().await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("API server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}
