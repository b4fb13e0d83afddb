//! A local HTTP server standing in for the hosted provider. Routes answer
//! with canned responses and every request is recorded so adapter tests can
//! assert on the headers, query and body that went over the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use super::lock;
use crate::config::{parse_provider_url, ProviderConfig};
use crate::provider::ProviderHttp;

pub const STUB_API_KEY: &str = "stub-anon-key";

/// One request as received by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubProvider {
    config: ProviderConfig,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubProvider {
    /// Bind an ephemeral local port and start answering
    pub async fn spawn() -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind stub provider")?;
        let addr = listener.local_addr()?;

        let state = Arc::new(StubState::default());
        let app = Router::new()
            .fallback(record_and_reply)
            .with_state(state.clone());
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!("stub provider stopped: {}", e);
            }
        });

        let mut config = ProviderConfig::new(parse_provider_url(&format!("http://{}", addr))?, STUB_API_KEY);
        config.retry_backoff_ms = 1;
        Ok(Self { config, state, server })
    }

    /// Answer `method path` with `status` and a JSON body from now on
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        lock(&self.state.routes).insert((method, path.to_string()), (status, body));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn http(&self) -> anyhow::Result<ProviderHttp> {
        Ok(ProviderHttp::new(&self.config)?)
    }
}

impl Drop for StubProvider {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn record_and_reply(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query = url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
        .into_owned()
        .collect();
    lock(&state.requests).push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query,
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let reply = lock(&state.routes).get(&(method, uri.path().to_string())).cloned();
    match reply {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "no stubbed route"}))).into_response(),
    }
}
