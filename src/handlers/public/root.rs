use std::path::PathBuf;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Json, Response},
};
use mockable::Clock;
use serde_json::json;

use crate::state::AppState;

/// GET / - Frontend entry page when one is deployed, otherwise a service descriptor
pub async fn index(static_dir: PathBuf) -> Response {
    match tokio::fs::read_to_string(static_dir.join("index.html")).await {
        Ok(page) => Html(page).into_response(),
        Err(_) => Json(json!({
            "name": "Publication Gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "register": "POST /register (public)",
                "token": "POST /token (public)",
                "create": "POST /publications (bearer)",
                "list": "GET /publications/:language (bearer)",
                "delete": "DELETE /publications/:id (bearer)",
                "health": "GET /health (public)"
            }
        }))
        .into_response(),
    }
}

/// GET /health - Liveness only; the provider is not contacted
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": state.clock.utc()
    }))
}
