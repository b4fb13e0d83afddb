//! Capability-typed facades over the hosted credential provider and table
//! store, plus their reqwest-backed adapters.

pub mod auth_client;
pub mod http;
pub mod rest_client;
pub mod retry;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::filter::{Filter, FilterError};
use crate::models::{Credentials, Session, User};

pub use auth_client::HttpCredentialProvider;
pub use http::ProviderHttp;
pub use rest_client::HttpRecordStore;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("provider request timed out")]
    Timeout,

    #[error("provider transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected provider response: {0}")]
    Decode(String),

    #[error("invalid provider request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Timeouts, connection failures and 5xx answers may succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Timeout | ProviderError::Transport(_) => true,
            ProviderError::Rejected { status, .. } => *status >= 500,
            ProviderError::Decode(_) | ProviderError::InvalidRequest(_) => false,
        }
    }

    /// Most specific human-readable message available
    pub fn detail(&self) -> String {
        match self {
            ProviderError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err)
        }
    }
}

impl From<FilterError> for ProviderError {
    fn from(err: FilterError) -> Self {
        ProviderError::InvalidRequest(err.to_string())
    }
}

/// Identity operations delegated to the hosted auth service
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Register an account. `None` means the provider accepted the request but
    /// returned no usable user (e.g. confirmation pending or duplicate).
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<User>, ProviderError>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ProviderError>;

    /// Resolve a bearer token; `None` when the token is invalid or expired
    async fn get_user(&self, access_token: &str) -> Result<Option<User>, ProviderError>;
}

/// Row operations delegated to the hosted table store.
///
/// Every call carries the caller's access token so store-side row policies
/// evaluate against the caller's identity.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one row and return it as stored (with assigned `id`, `created_at`)
    async fn insert(&self, table: &str, row: Value, access_token: &str) -> Result<Value, ProviderError>;

    async fn select(&self, table: &str, filter: &Filter, access_token: &str) -> Result<Vec<Value>, ProviderError>;

    /// Delete matching rows, returning the rows actually removed
    async fn delete(&self, table: &str, filter: &Filter, access_token: &str) -> Result<Vec<Value>, ProviderError>;
}
