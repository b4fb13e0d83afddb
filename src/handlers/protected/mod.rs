// handlers/protected/mod.rs - Endpoints behind the bearer-token gate
//
// `require_auth` runs first on every route here and injects `AuthUser`;
// handlers never see an unauthenticated request.
pub mod publications;

pub use publications::{create_post, delete_by_id, list_by_language};
