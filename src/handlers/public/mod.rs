// handlers/public/mod.rs - Endpoints that require no authentication
pub mod auth;
pub mod root;

pub use auth::{register_post, token_post};
pub use root::{health, index};
