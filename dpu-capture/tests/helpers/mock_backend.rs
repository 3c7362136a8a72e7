//! Local stand-in for the reporting web app
//!
//! Answers every POST to `/exec` with a fixed status and body and records
//! what it received.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Redirect,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockBackend {
    /// URL to configure as the report endpoint
    pub url: String,
    base: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start(status: StatusCode, body: impl Into<String>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            body: body.into(),
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/exec", post(record))
            // Hosted script platforms answer the POST with a redirect to the result
            .route("/redirecting", post(redirect_to_result))
            .route("/result", get(result))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = format!("http://{}", addr);
        Self {
            url: format!("{}/exec", base),
            base,
            requests,
            handle,
        }
    }

    /// Endpoint that records the POST, then redirects to the canned answer
    pub fn redirecting_url(&self) -> String {
        format!("{}/redirecting", self.base)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn capture(state: &MockState, headers: &HeaderMap, body: String) {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        content_type: header_value(header::CONTENT_TYPE),
        cache_control: header_value(header::CACHE_CONTROL),
        body,
    });
}

async fn record(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    capture(&state, &headers, body);
    (state.status, state.body.clone())
}

async fn redirect_to_result(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Redirect {
    capture(&state, &headers, body);
    Redirect::to("/result")
}

async fn result(State(state): State<MockState>) -> (StatusCode, String) {
    (state.status, state.body.clone())
}

/// URL on which nothing is listening
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/exec", addr)
}
