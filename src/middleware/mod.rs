pub mod auth;
pub mod response;

pub use auth::{authenticate, extract_bearer_token, require_auth, AuthUser};
pub use response::{ApiResponse, ApiResult};
