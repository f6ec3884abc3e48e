//! Common test utilities and fixtures
//!
//! Fixture paths, a recording mock of the OpenAI Responses endpoint, and
//! helpers for driving the router without a socket.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::Value;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Get the custom persona table fixture path
pub fn personas_fixture() -> PathBuf {
    fixture_path("personas.toml")
}

// ─────────────────────────────────────────────────────────────────
// Mock OpenAI server
// ─────────────────────────────────────────────────────────────────

/// One request received by the mock upstream
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockUpstreamState {
    status: StatusCode,
    body: String,
    content_type: &'static str,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

/// A local stand-in for `POST /v1/responses` that answers every call with
/// a fixed status and body.
pub struct MockUpstream {
    pub base_url: String,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl MockUpstream {
    /// Upstream answering 200 with `{"output_text": text}`
    pub async fn replying(text: &str) -> Self {
        let body = serde_json::json!({ "id": "resp_test", "output_text": text }).to_string();
        Self::start(StatusCode::OK, body, "application/json").await
    }

    /// Upstream answering with an arbitrary JSON body
    pub async fn json(status: StatusCode, body: Value) -> Self {
        Self::start(status, body.to_string(), "application/json").await
    }

    /// Upstream answering with a plain-text body
    pub async fn plain(status: StatusCode, body: &str) -> Self {
        Self::start(status, body.to_string(), "text/plain").await
    }

    async fn start(status: StatusCode, body: String, content_type: &'static str) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = MockUpstreamState {
            status,
            body,
            content_type,
            received: received.clone(),
        };

        let app = Router::new()
            .route("/v1/responses", post(mock_responses))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            received,
        }
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().clone()
    }
}

async fn mock_responses(
    State(state): State<MockUpstreamState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.received.lock().push(ReceivedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    (
        state.status,
        [("content-type", state.content_type)],
        state.body.clone(),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────────────
// Request helpers
// ─────────────────────────────────────────────────────────────────

/// `POST /api/chat` with a JSON body
pub fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `POST /api/chat` with a raw body
pub fn raw_chat_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

/// Read a response body as UTF-8 text
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_fixtures_exist() {
        assert!(valid_config_fixture().exists());
        assert!(invalid_config_fixture().exists());
        assert!(personas_fixture().exists());
    }
}
