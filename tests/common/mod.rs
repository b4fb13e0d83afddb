#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use publication_gateway::config::{SecurityConfig, ServerConfig};
use publication_gateway::{router, AppState};
use publication_gateway::testing::InMemoryBackend;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub backend: Arc<InMemoryBackend>,
    pub client: Client,
}

impl TestServer {
    /// Serve the full router in-process on a free port, backed by a fresh
    /// in-memory provider
    pub async fn spawn() -> Result<Self> {
        let backend = Arc::new(InMemoryBackend::new());
        let state = backend.app_state();
        Self::spawn_with_state(backend, state).await
    }

    /// Serve the router over a caller-assembled state. `backend` remains the
    /// handle for seeding users and inspecting in-memory rows.
    pub async fn spawn_with_state(backend: Arc<InMemoryBackend>, state: AppState) -> Result<Self> {
        let server = ServerConfig {
            static_dir: "tests/fixtures/no-static".to_string(),
            ..ServerConfig::default()
        };
        let app = router(state, &server, &SecurityConfig::default());

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("test server stopped: {e}");
            }
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            backend,
            client: Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/token"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Register + login, returning the access token
    pub async fn signed_in(&self, email: &str) -> Result<String> {
        self.register(email, "pw").await?;
        let session: Value = self.login(email, "pw").await?.json().await?;
        session["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login returned no access_token")
    }

    pub async fn create_publication(&self, token: &str, body: &Value) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/publications"))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn list_room(&self, token: &str, language: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(&format!("/publications/{}", language)))
            .bearer_auth(token)
            .send()
            .await?)
    }

    pub async fn delete_publication(&self, token: &str, id: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(&format!("/publications/{}", id)))
            .bearer_auth(token)
            .send()
            .await?)
    }
}

pub fn publication(language: &str, title: &str) -> Value {
    json!({
        "title": title,
        "content": format!("{} body", title),
        "language": language,
        "publish_period": "week",
        "pub_code": "PX-1"
    })
}

/// Ids of a listed room, in response order
pub fn ids(rows: &Value) -> Vec<String> {
    rows.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
