use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use mockable::Clock;
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::PublicationInput;
use crate::state::AppState;

/// POST /publications - Publish into a language room
///
/// Required: `title, content, language, publish_period, pub_code`.
/// Optional: `cover_image, style`. Ownership (`user_id`, `user_email`) comes
/// from the resolved token and `expires_at` is now + 28 days; client values
/// for those fields are ignored. Responds 201 with the stored row.
pub async fn post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let input = PublicationInput::from_json(body)?;

    let record = input.into_record(&auth_user.identity(), state.clock.utc());
    let row = serde_json::to_value(&record).map_err(|e| {
        tracing::error!("Failed to serialize publication: {}", e);
        ApiError::operation_failed("Could not create publication")
    })?;

    let inserted = state
        .store
        .insert(&state.publications_table, row, &auth_user.access_token)
        .await
        .map_err(|e| {
            tracing::error!("Insert into {} failed for user {}: {}", state.publications_table, auth_user.id, e);
            ApiError::operation_failed("Could not create publication")
        })?;

    tracing::info!(
        "User {} published into room '{}' (expires {})",
        auth_user.id,
        record.language,
        record.expires_at
    );
    Ok(ApiResponse::created(inserted))
}
