use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::models::User;
use crate::provider::CredentialProvider;
use crate::state::AppState;

/// Caller identity resolved from the bearer token, plus the token itself so
/// store calls run under the caller's row policies.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub access_token: String,
}

impl AuthUser {
    pub fn identity(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }
}

/// Bearer authentication middleware: resolves the token with the credential
/// provider and injects `AuthUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = authenticate(request.headers(), state.credentials.as_ref()).await?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Validate the Authorization header and resolve it to an identity.
/// Holds no session state; every request is checked independently.
pub async fn authenticate(
    headers: &HeaderMap,
    provider: &dyn CredentialProvider,
) -> Result<AuthUser, ApiError> {
    let token = extract_bearer_token(headers).map_err(|msg| {
        tracing::debug!("Rejected request: {}", msg);
        ApiError::unauthenticated("Authentication token required")
    })?;

    let user = provider.get_user(&token).await.map_err(|e| {
        tracing::error!("Token resolution failed: {}", e);
        ApiError::operation_failed("Could not verify authentication token")
    })?;

    match user {
        Some(user) => Ok(AuthUser {
            id: user.id,
            email: user.email,
            access_token: token,
        }),
        None => {
            tracing::debug!("Rejected request: token did not resolve to a user");
            Err(ApiError::unauthenticated("Invalid or expired token"))
        }
    }
}

/// Extract `<token>` from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = auth_str
        .trim()
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("Empty bearer token");
    }
    if token.contains(char::is_whitespace) {
        return Err("Malformed bearer token");
    }
    Ok(token.to_string())
}
