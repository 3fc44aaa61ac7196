//! Integration tests for the auth bridge HTTP API.

use async_trait::async_trait;
use auth_bridge::api::{create_router_with_rate_limit, AppState, RateLimitState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chat_client::ChatClient;
use handshake_store::{ConfirmationSender, CorrelationHint, HandshakeStore, PromptRequest, SendError};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mock! {
    pub Sender {}

    #[async_trait]
    impl ConfirmationSender for Sender {
        async fn send_confirmation(&self, prompt: &PromptRequest) -> Result<String, SendError>;
    }
}

fn sender_ok() -> MockSender {
    let mut sender = MockSender::new();
    sender
        .expect_send_confirmation()
        .returning(|_| Ok("m-prompt".to_string()));
    sender
}

/// Chat client that is never contacted.
fn offline_chat() -> ChatClient {
    ChatClient::new("http://localhost:9999", "test-bot-token").unwrap()
}

fn create_test_app(sender: MockSender, chat: ChatClient) -> (Router, HandshakeStore) {
    let store = HandshakeStore::new(Arc::new(sender), Duration::from_secs(300));
    let state = AppState::new(store.clone(), chat);
    let app = create_router_with_rate_limit(state, RateLimitState::permissive());
    (app, store)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let chat = ChatClient::new(mock_server.uri(), "test-bot-token").unwrap();
    let (app, _) = create_test_app(MockSender::new(), chat);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["pending_handshakes"], 0);
    assert_eq!(json["chat_api_healthy"], true);
}

#[tokio::test]
async fn test_request_then_check_pending() {
    let (app, _) = create_test_app(sender_ok(), offline_chat());

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/request",
            serde_json::json!({"owner_id": "u1", "owner_name": "Alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    let token = json["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 32);

    let response = app
        .oneshot(get(&format!("/auth/check/{}", token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(
        json,
        serde_json::json!({"verified": false, "expired": false, "owner_name": "Alice"})
    );
}

#[tokio::test]
async fn test_request_accepts_dashboard_field_names() {
    let mut sender = MockSender::new();
    sender
        .expect_send_confirmation()
        .withf(|prompt| {
            prompt.owner_id == "1001"
                && prompt.owner_name == "Steve"
                && prompt.client_hint.as_deref() == Some("198.51.100.4")
        })
        .times(1)
        .returning(|_| Ok("m-prompt".to_string()));

    let (app, _) = create_test_app(sender, offline_chat());

    let response = app
        .oneshot(post_json(
            "/auth/request",
            serde_json::json!({"userId": "1001", "userName": "Steve", "userIp": "198.51.100.4"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_missing_owner_is_rejected() {
    let mut sender = MockSender::new();
    sender.expect_send_confirmation().times(0);

    let (app, store) = create_test_app(sender, offline_chat());

    let response = app
        .oneshot(post_json(
            "/auth/request",
            serde_json::json!({"owner_name": "Alice"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(store.pending_count().await, 0);
}

#[tokio::test]
async fn test_request_with_malformed_body_is_rejected() {
    let mut sender = MockSender::new();
    sender.expect_send_confirmation().times(0);

    let (app, _) = create_test_app(sender, offline_chat());

    let wrong_types = post_json(
        "/auth/request",
        serde_json::json!({"owner_id": 123, "owner_name": "Alice"}),
    );
    let not_json = Request::builder()
        .method("POST")
        .uri("/auth/request")
        .header("content-type", "application/json")
        .body(Body::from("owner_id=u1"))
        .unwrap();
    let no_content_type = Request::builder()
        .method("POST")
        .uri("/auth/request")
        .body(Body::from(r#"{"owner_id":"u1","owner_name":"Alice"}"#))
        .unwrap();

    for request in [wrong_types, not_json, no_content_type] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_request_send_failure_is_bad_gateway() {
    let mut sender = MockSender::new();
    sender
        .expect_send_confirmation()
        .returning(|_| Err(SendError::new("channel unavailable")));

    let (app, store) = create_test_app(sender, offline_chat());

    let response = app
        .oneshot(post_json(
            "/auth/request",
            serde_json::json!({"owner_id": "u1", "owner_name": "Alice"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["code"], "UPSTREAM_SEND_ERROR");
    assert!(json["error"].as_str().unwrap().contains("channel unavailable"));
    assert_eq!(store.pending_count().await, 0);
}

#[tokio::test]
async fn test_check_unknown_token_reports_expired() {
    let (app, _) = create_test_app(MockSender::new(), offline_chat());

    let response = app.oneshot(get("/auth/check/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json, serde_json::json!({"verified": false, "expired": true}));
}

#[tokio::test]
async fn test_check_after_confirmation() {
    let (app, store) = create_test_app(sender_ok(), offline_chat());
    let issued = store.create("u1", "Alice", None).await.unwrap();

    assert!(
        store
            .confirm("u1", &CorrelationHint::from_reply("m-prompt", None))
            .await
    );

    let response = app
        .oneshot(get(&format!("/auth/check/{}", issued.token)))
        .await
        .unwrap();

    let json = json_body(response).await;
    assert_eq!(json["verified"], true);
    assert_eq!(json["expired"], false);
}

#[tokio::test(start_paused = true)]
async fn test_check_after_window_reports_expired() {
    let (app, store) = create_test_app(sender_ok(), offline_chat());
    let issued = store.create("u1", "Alice", None).await.unwrap();

    tokio::time::advance(Duration::from_secs(301)).await;

    let response = app
        .oneshot(get(&format!("/auth/check/{}", issued.token)))
        .await
        .unwrap();

    let json = json_body(response).await;
    assert_eq!(json, serde_json::json!({"verified": false, "expired": true}));
    assert_eq!(store.pending_count().await, 0);
}

#[tokio::test]
async fn test_rate_limit_applies_to_login_requests() {
    let store = HandshakeStore::new(Arc::new(sender_ok()), Duration::from_secs(300));
    let state = AppState::new(store, offline_chat());
    let app = create_router_with_rate_limit(state, RateLimitState::new(1));

    let login = || {
        post_json(
            "/auth/request",
            serde_json::json!({"owner_id": "u1", "owner_name": "Alice"}),
        )
    };

    let response = app.clone().oneshot(login()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(login()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let json = json_body(response).await;
    assert_eq!(json["code"], "RATE_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn test_polling_is_never_rate_limited() {
    let store = HandshakeStore::new(Arc::new(MockSender::new()), Duration::from_secs(300));
    let state = AppState::new(store, offline_chat());
    let app = create_router_with_rate_limit(state, RateLimitState::new(5));

    for _ in 0..50 {
        let response = app.clone().oneshot(get("/auth/check/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (app, _) = create_test_app(MockSender::new(), offline_chat());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/check/abc")
                .header("origin", "http://dashboard.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
