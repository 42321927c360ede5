//! HTTP API integration tests
//!
//! The router is exercised in-process with `tower::ServiceExt::oneshot`,
//! backed by the in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use notifier_service::auth::Claims;
use notifier_service::config::{
    ApiConfig, DatabaseConfig, JwtConfig, NotifierConfig, RedisConfig, ServerConfig, Settings,
    StoreConfig, TelemetryConfig, TemplateConfig,
};
use notifier_service::dispatch::MemoryUserDirectory;
use notifier_service::server::{create_app, AppState};

const JWT_SECRET: &str = "http-test-secret";
const API_KEY: &str = "admin-key";

fn test_settings() -> Settings {
    let templates = vec![TemplateConfig {
        name: "greeting".to_string(),
        title: "Hello {name}".to_string(),
        body: "Welcome, {name}!".to_string(),
    }];

    Settings {
        server: ServerConfig::default(),
        api: ApiConfig {
            key: Some(API_KEY.to_string()),
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            issuer: None,
            audience: None,
        },
        database: DatabaseConfig::default(),
        store: StoreConfig::default(),
        redis: RedisConfig::default(),
        notifier: NotifierConfig {
            strict_templates: true,
            templates,
            ..NotifierConfig::default()
        },
        telemetry: TelemetryConfig::default(),
    }
}

fn create_test_app() -> Router {
    let directory = MemoryUserDirectory::new()
        .with_assignment("alice", "staff")
        .with_assignment("bob", "staff");
    create_app(AppState::in_memory(test_settings(), Arc::new(directory)))
}

fn token_for(user_id: &str) -> String {
    encode(
        &Header::default(),
        &Claims::for_user(user_id, 3600),
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn user_request(method: &str, uri: &str, user_id: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(user_id)))
        .body(Body::empty())
        .unwrap()
}

fn notify_request(payload: Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/notify")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["backend"], "memory");
    assert_eq!(body["templates"], 1);
}

#[tokio::test]
async fn test_notifications_require_caller() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/api/v1/notifications")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let request = Request::builder()
        .uri("/api/v1/notifications")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_notify_requires_api_key() {
    let app = create_test_app();
    let payload = json!({"users": "alice", "template": "greeting"});

    let (status, _) = send(&app, notify_request(payload.clone(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, notify_request(payload, Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_notify_list_and_mark_read() {
    let app = create_test_app();

    let payload = json!({
        "roles": "staff",
        "template": "greeting",
        "vars": {"name": "team"}
    });
    let (status, body) = send(&app, notify_request(payload, Some(API_KEY))).await;
    assert_eq!(status, StatusCode::CREATED);
    let tracking_id = body["tracking_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, user_request("GET", "/api/v1/notifications", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let notification = &body["notifications"][0];
    assert_eq!(notification["title"], "Hello team");
    assert_eq!(notification["body"], "Welcome, team!");
    assert_eq!(notification["tracking_id"], tracking_id.as_str());
    assert_eq!(notification["unread"], true);
    let id = notification["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        user_request("GET", "/api/v1/notifications/count?state=unread", "alice"),
    )
    .await;
    assert_eq!(body["count"], 1);

    let uri = format!("/api/v1/notifications/{}/read", id);
    let (status, body) = send(&app, user_request("POST", &uri, "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let uri = format!("/api/v1/notifications/{}", id);
    let (status, body) = send(&app, user_request("GET", &uri, "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["read"], true);

    // bob's copy is untouched and not visible to alice
    let (_, body) = send(
        &app,
        user_request("GET", "/api/v1/notifications?state=unread", "bob"),
    )
    .await;
    assert_eq!(body["total"], 1);
    let bob_id = body["notifications"][0]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/notifications/{}", bob_id);
    let (status, body) = send(&app, user_request("GET", &uri, "alice")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_notify_unknown_template_rejected() {
    let app = create_test_app();

    let payload = json!({"users": ["alice"], "template": "missing"});
    let (status, body) = send(&app, notify_request(payload, Some(API_KEY))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNKNOWN_TEMPLATE");
}

#[tokio::test]
async fn test_admin_user_routes() {
    let app = create_test_app();

    let payload = json!({"users": ["alice", 42], "template": "greeting"});
    let (status, _) = send(&app, notify_request(payload, Some(API_KEY))).await;
    assert_eq!(status, StatusCode::CREATED);

    let request = Request::builder()
        .uri("/api/v1/users/42/notifications/count")
        .header("X-API-Key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/42/notifications/read")
        .header("X-API-Key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(body["updated"], 1);

    let (_, body) = send(
        &app,
        user_request("GET", "/api/v1/notifications/count?state=unread", "alice"),
    )
    .await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_invalid_query_is_validation_error() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        user_request("GET", "/api/v1/notifications?order=password", "alice"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_timestamp_is_validation_error() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        user_request("GET", "/api/v1/notifications?created_after=yesterday", "alice"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_non_numeric_id_is_validation_error() {
    let app = create_test_app();

    let (status, body) = send(&app, user_request("GET", "/api/v1/notifications/abc", "alice")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        user_request("POST", "/api/v1/notifications/abc/read", "alice"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/alice/notifications/read?id=abc")
        .header("X-API-Key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_notify_body_without_template_is_validation_error() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        notify_request(json!({"users": "alice"}), Some(API_KEY)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/notify")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-API-Key", API_KEY)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_templates_listing() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/api/v1/templates")
        .header("X-API-Key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["templates"][0]["name"], "greeting");
    assert_eq!(body["templates"][0]["title"], "Hello {name}");
}
