use std::path::PathBuf;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{SecurityConfig, ServerConfig};
use crate::handlers;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Full HTTP surface: public auth routes, bearer-gated publication routes,
/// landing page, static assets and health, with tracing and CORS applied.
pub fn router(state: AppState, server: &ServerConfig, security: &SecurityConfig) -> Router {
    let static_dir = PathBuf::from(&server.static_dir);

    Router::new()
        // Public
        .route("/", get(move || handlers::index(static_dir.clone())))
        .route("/health", get(handlers::health))
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .merge(auth_public_routes())
        // Protected
        .merge(publication_routes(state.clone()))
        .with_state(state)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(security)),
        )
}

fn auth_public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register_post))
        .route("/token", post(handlers::token_post))
}

fn publication_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/publications", post(handlers::create_post))
        // One path pattern serves both: the segment is a room for GET, an id for DELETE
        .route(
            "/publications/:segment",
            get(handlers::list_by_language).delete(handlers::delete_by_id),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
