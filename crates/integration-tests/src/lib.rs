//! Integration tests for Reusify.
//!
//! The full router (sessions, request IDs, tracing and Sentry layers
//! included) runs in-process over the in-memory store, so no database or
//! network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p reusify-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Registration, login, logout, unauthenticated access
//! - `snippets` - Snippet JSON API and snippet actions
//! - `tags` - Tag actions and tag ownership rules
//! - `health` - Liveness and readiness
//! - `postgres` - The `PostgreSQL` store against a live server (ignored by
//!   default, see `tests/postgres.rs`)

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use reusify_server::config::{SentryConfig, ServerConfig};
use reusify_server::db::MemoryStore;
use reusify_server::middleware::create_session_layer;
use reusify_server::state::AppState;

/// Session secret used by every test app (long and varied enough to sign).
const TEST_SESSION_SECRET: &str =
    "t3st-Secret_for-Reusify-integration-9f8e7d6c5b4a3928171605f4e3d2c1b0aZyXwVuTsRqPoN";

/// A fresh application over empty in-memory stores.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// Build the app with the default popular-tags limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Build the app with a custom configuration.
    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        let session_layer =
            create_session_layer(tower_sessions::MemoryStore::default(), &config).unwrap();
        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        Self {
            router: reusify_server::app(state, session_layer),
        }
    }

    /// A client with its own cookie jar.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the test app: plain HTTP, so development cookie rules.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from(String::from("postgres://unused")),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: url::Url::parse("http://localhost:3000").unwrap(),
        session_secret: SecretString::from(TEST_SESSION_SECRET.to_owned()),
        popular_tag_limit: 10,
        log_json: false,
        sentry: SentryConfig::default(),
    }
}

/// A response with its body parsed as JSON (`Value::Null` for empty bodies).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookie: Option<String>,
    pub request_id: Option<String>,
}

impl TestResponse {
    /// The `error` field of a failure body.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// Whether an action envelope reports success.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.body["success"].as_bool().unwrap_or(false)
    }
}

/// Drives the router one request at a time, remembering the session cookie.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Send a request with an optional JSON body.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        if let Some(set_cookie) = &set_cookie {
            self.remember(set_cookie);
        }
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            body,
            set_cookie,
            request_id,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Register an account, leaving this client logged in. Returns the user
    /// ID.
    pub async fn register(&mut self, name: &str, email: &str) -> i64 {
        let response = self
            .post(
                "/api/auth/register",
                serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": "correct horse battery",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().unwrap()
    }

    /// Create a snippet through the JSON API. Returns the created snippet.
    pub async fn create_snippet(&mut self, title: &str, tags: &[&str]) -> Value {
        let response = self
            .post(
                "/api/snippets/create",
                serde_json::json!({
                    "title": title,
                    "language": "rust",
                    "content": format!("// {title}"),
                    "tags": tags,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }

    /// Whether the client currently holds a session cookie.
    #[must_use]
    pub const fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    /// The `name=value` pair sent as the `Cookie` header.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Replace the stored cookie.
    pub fn set_cookie(&mut self, cookie: String) {
        self.cookie = Some(cookie);
    }

    fn remember(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let expired = set_cookie.to_ascii_lowercase().contains("max-age=0");
        let empty = pair.ends_with('=');
        self.cookie = if expired || empty {
            None
        } else {
            Some(pair.to_owned())
        };
    }
}

/// Tag names of a serialized snippet.
#[must_use]
pub fn tag_names(snippet: &Value) -> Vec<String> {
    snippet["tags"]
        .as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
