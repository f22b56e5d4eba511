//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use modhub_api::{AppState, build_app};
use modhub_core::config::AppConfig;
use modhub_core::types::UserId;
use modhub_entity::user::User;

/// Multipart boundary used by [`TestApp::upload`].
const BOUNDARY: &str = "modhub-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct inspection
    pub state: AppState,
    /// The seeded super-admin
    pub root: User,
}

impl TestApp {
    /// Create a new test application with default configuration and the
    /// local reputation scanner.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application from `config`.
    pub fn with_config(config: AppConfig) -> Self {
        let bootstrap = config.bootstrap.clone();
        let state = AppState::from_config(config).expect("Failed to build state");
        let root = state
            .hub
            .bootstrap_super_admin(&bootstrap)
            .expect("Failed to seed super-admin");
        let router = build_app(state.clone());
        Self {
            router,
            state,
            root,
        }
    }

    /// Register a member through the API and return its ID.
    pub async fn register(&self, username: &str) -> UserId {
        let body = serde_json::json!({ "username": username, "display_name": username });
        let response = self.request("POST", "/api/users", Some(body), None).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "register failed: {:?}",
            response.body
        );
        parse_id(&response.body["data"]["id"])
    }

    /// Register a user and promote it to admin.
    pub async fn register_admin(&self, username: &str) -> UserId {
        let id = self.register(username).await;
        let response = self
            .request(
                "PUT",
                &format!("/api/users/{id}/role"),
                Some(serde_json::json!({ "role": "admin" })),
                Some(self.root.id),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "promote failed: {:?}", response.body);
        id
    }

    /// Send a JSON request acting as `user`.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<UserId>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = user {
            req = req.header("X-User-Id", user.to_string());
        }

        let req = req.body(Body::from(body_str)).expect("Failed to build request");
        self.send(req).await
    }

    /// Upload `data` as `filename` acting as `user`.
    pub async fn upload(
        &self,
        user: UserId,
        filename: &str,
        data: &[u8],
        mode: &str,
    ) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(format!("/api/files/upload?moderation_mode={mode}"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("X-User-Id", user.to_string())
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Wait until `count` sessions are registered.
    pub async fn wait_for_sessions(&self, count: usize) {
        let sessions = self.state.realtime.sessions.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while sessions.session_count() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Sessions did not register in time");
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Parse an ID out of a JSON string value.
pub fn parse_id<T: std::str::FromStr>(value: &Value) -> T
where
    T::Err: std::fmt::Debug,
{
    value
        .as_str()
        .expect("id is not a string")
        .parse()
        .expect("id does not parse")
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
