use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{CredentialsInput, Session};
use crate::state::AppState;

/// POST /token - Exchange email and password for a provider session
///
/// On success the provider's session object (access token, refresh token,
/// expiry, user) is returned untouched. Any provider failure becomes a
/// generic 401.
pub async fn token_post(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsInput>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(input) = payload?;
    let credentials = input.validate()?;

    let session = state
        .credentials
        .sign_in_with_password(&credentials)
        .await
        .map_err(|e| {
            tracing::warn!("Login failed for {}: {}", credentials.email, e);
            ApiError::unauthenticated("Invalid email or password")
        })?;

    Ok(ApiResponse::success(session))
}
