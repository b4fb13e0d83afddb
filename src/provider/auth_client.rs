use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use super::http::{rejected, ProviderHttp};
use super::retry::with_read_retries;
use super::{CredentialProvider, ProviderError};
use crate::models::{Credentials, Session, User};

const SIGNUP_PATH: &str = "auth/v1/signup";
const TOKEN_PATH: &str = "auth/v1/token";
const USER_PATH: &str = "auth/v1/user";

/// Credential provider backed by the hosted auth REST API
#[derive(Debug, Clone)]
pub struct HttpCredentialProvider {
    http: ProviderHttp,
}

impl HttpCredentialProvider {
    pub fn new(http: ProviderHttp) -> Self {
        Self { http }
    }

    async fn fetch_user(&self, access_token: &str) -> Result<Option<User>, ProviderError> {
        let url = self.http.endpoint(USER_PATH)?;
        let response = self
            .http
            .send(self.http.request(Method::GET, url, Some(access_token)))
            .await?;

        match response.status() {
            // Malformed, expired and revoked tokens
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let payload: Value = ProviderHttp::decode(response).await?;
                Ok(User::from_provider_payload(&payload))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(rejected(status, &body))
            }
        }
    }
}

#[async_trait]
impl CredentialProvider for HttpCredentialProvider {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<User>, ProviderError> {
        let url = self.http.endpoint(SIGNUP_PATH)?;
        let response = self
            .http
            .send(self.http.request(Method::POST, url, None).json(credentials))
            .await?;
        let payload: Value = ProviderHttp::decode(response).await?;
        Ok(User::from_provider_payload(&payload))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ProviderError> {
        let mut url = self.http.endpoint(TOKEN_PATH)?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response = self
            .http
            .send(self.http.request(Method::POST, url, None).json(credentials))
            .await?;
        ProviderHttp::decode(response).await
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, ProviderError> {
        with_read_retries("get_user", self.http.read_retries, self.http.retry_backoff, || {
            self.fetch_user(access_token)
        })
        .await
    }
}
