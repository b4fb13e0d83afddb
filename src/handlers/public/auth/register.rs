use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::CredentialsInput;
use crate::state::AppState;

/// POST /register - Create an account with the credential provider
///
/// Input: `{"email": "...", "password": "..."}`
///
/// - 201 `{"message": "User <email> registered successfully"}`
/// - 400 when either field is missing or blank
/// - 500 with the provider's own message when sign-up fails, or a generic
///   message when the provider returns no user
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    let credentials = input.validate()?;

    match state.credentials.sign_up(&credentials).await {
        Ok(Some(user)) => {
            let email = user.email.unwrap_or(credentials.email);
            tracing::info!("Registered user {}", user.id);
            Ok(ApiResponse::message(
                format!("User {} registered successfully", email),
                StatusCode::CREATED,
            ))
        }
        Ok(None) => {
            tracing::warn!("Sign-up for {} returned no user", credentials.email);
            Err(ApiError::operation_failed("Could not register user"))
        }
        Err(e) => {
            tracing::error!("Sign-up for {} failed: {}", credentials.email, e);
            Err(ApiError::operation_failed(e.detail()))
        }
    }
}
