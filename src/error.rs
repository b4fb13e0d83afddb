// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::provider::ProviderError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    InvalidInput {
        message: String,
        missing: Vec<String>,
    },

    // 401 Unauthorized
    Unauthenticated(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    OperationFailed(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidInput { message, .. } => message,
            ApiError::Unauthenticated(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::OperationFailed(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput { .. } => "INVALID_INPUT",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::OperationFailed(_) => "OPERATION_FAILED",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::InvalidInput { missing, .. } = self {
            if !missing.is_empty() {
                body["missing"] = json!(missing);
            }
        }

        body
    }
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::InvalidInput {
            message: message.into(),
            missing: Vec::new(),
        }
    }

    /// 400 naming every absent required field
    pub fn missing_fields(missing: Vec<String>) -> Self {
        ApiError::InvalidInput {
            message: format!("Missing required fields: {}", missing.join(", ")),
            missing,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        ApiError::OperationFailed(message.into())
    }
}

// Collaborator failures never leak detail by default; handlers that relay the
// provider message (registration) build the ApiError themselves.
impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        tracing::error!("Provider call failed: {}", err);
        ApiError::operation_failed("An error occurred while processing your request")
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::invalid_input("Request body must be a JSON object")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
