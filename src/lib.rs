pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod provider;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use app::router;
pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;
