//! In-process stub backend for HTTP-driven tests
//!
//! Serves canned responses keyed by `"METHOD /path"` (query ignored) and
//! records every request it receives.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::config::{ApiConfig, NotificationConfig};
use crate::session::MemoryTokenStore;
use crate::view::{NotificationCenter, ViewController};

#[derive(Debug, Clone)]
pub struct StubResponse {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
    delay: Option<Duration>,
}

impl StubResponse {
    pub fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: value.to_string().into_bytes(),
            delay: None,
        }
    }

    pub fn text(status: u16, content_type: &str, body: &str) -> Self {
        Self {
            status,
            content_type: Some(content_type.to_string()),
            body: body.as_bytes().to_vec(),
            delay: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
            delay: None,
        }
    }

    /// Hold the response back, to keep a request in flight
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn into_http(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.content_type {
            Some(ct) => (status, [(header::CONTENT_TYPE, ct)], self.body).into_response(),
            None => (status, self.body).into_response(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or(&self.uri)
    }

    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<String, StubResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubApi {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubApi {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Register (or replace) the response for a route
    pub fn route(&self, method: &str, path: &str, response: StubResponse) {
        self.state
            .routes
            .lock()
            .insert(format!("{} {}", method, path), response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path() == path)
            .count()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self, token: Option<&str>) -> Arc<ApiClient> {
        let config = ApiConfig {
            base_url: self.base_url(),
            request_timeout_secs: 5,
        };
        let tokens = Arc::new(MemoryTokenStore::new(token.map(str::to_string)));
        Arc::new(ApiClient::new(&config, tokens).unwrap())
    }

    pub fn controller(&self, token: Option<&str>) -> ViewController {
        ViewController::new(
            self.client(token),
            NotificationCenter::new(NotificationConfig::default()),
        )
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().push(RecordedRequest {
        method: method.to_string(),
        uri: uri.to_string(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    let key = format!("{} {}", method, uri.path());
    let response = state.routes.lock().get(&key).cloned();

    match response {
        Some(response) => {
            if let Some(delay) = response.delay {
                tokio::time::sleep(delay).await;
            }
            response.into_http()
        }
        None => StubResponse::json(404, json!({ "message": format!("No route for {}", key) }))
            .into_http(),
    }
}
