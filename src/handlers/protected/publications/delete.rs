use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::publication::columns;
use crate::state::AppState;

/// DELETE /publications/:id - Remove a publication
///
/// Ownership is enforced by the store's row policy, evaluated against the
/// caller's token. A delete that removes nothing is a 404 whether the row is
/// absent or belongs to someone else; the two cases are not distinguished.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(publication_id): Path<String>,
) -> ApiResult<Value> {
    let filter = Filter::new().eq(columns::ID, publication_id.clone());

    let deleted = state
        .store
        .delete(&state.publications_table, &filter, &auth_user.access_token)
        .await?;

    if deleted.is_empty() {
        tracing::debug!("Delete of publication {} by {} matched nothing", publication_id, auth_user.id);
        return Err(ApiError::not_found(format!("Publication {} not found", publication_id)));
    }

    tracing::info!("User {} deleted publication {}", auth_user.id, publication_id);
    Ok(ApiResponse::message("Publication deleted", StatusCode::OK))
}
