use axum::extract::{Extension, Path, State};
use mockable::Clock;
use serde_json::Value;

use crate::filter::{Filter, SortDirection};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::publication::columns;
use crate::state::AppState;

/// GET /publications/:language - Live publications in a room, newest first
///
/// `language` is matched exactly (case-sensitive). Publications whose
/// `expires_at` is at or before the current server time are excluded. An
/// empty room is an empty array, never an error.
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(language): Path<String>,
) -> ApiResult<Vec<Value>> {
    let now = state.clock.utc();
    let filter = Filter::new()
        .eq(columns::LANGUAGE, language)
        .gt(columns::EXPIRES_AT, now.to_rfc3339())
        .order(columns::CREATED_AT, SortDirection::Desc);

    let rows = state
        .store
        .select(&state.publications_table, &filter, &auth_user.access_token)
        .await?;

    Ok(ApiResponse::success(rows))
}
