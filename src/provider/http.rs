use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::ProviderError;
use crate::config::ProviderConfig;

const USER_AGENT: &str = concat!("publication-gateway/", env!("CARGO_PKG_VERSION"));

/// Transport shared by the auth and table-store adapters: one reqwest client
/// with a request timeout, the provider base URL and the project API key.
#[derive(Debug, Clone)]
pub struct ProviderHttp {
    client: Client,
    base: Url,
    api_key: String,
    pub(crate) read_retries: u32,
    pub(crate) retry_backoff: Duration,
}

impl ProviderHttp {
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base: config.url.clone(),
            api_key: config.api_key.clone(),
            read_retries: config.read_retries,
            retry_backoff: config.retry_backoff(),
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base
            .join(path)
            .map_err(|e| ProviderError::InvalidRequest(format!("bad endpoint '{}': {}", path, e)))
    }

    /// Request carrying the API key; `bearer` defaults to the API key itself
    pub fn request(&self, method: reqwest::Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer.unwrap_or(&self.api_key))
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        Ok(request.send().await?)
    }

    /// Decode a 2xx body, or turn anything else into `ProviderError::Rejected`
    pub async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejected(status, &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| ProviderError::Decode(format!("invalid JSON from provider ({}): {}", status, e)))
    }
}

pub fn rejected(status: StatusCode, body: &str) -> ProviderError {
    ProviderError::Rejected {
        status: status.as_u16(),
        message: extract_error_message(status, body),
    }
}

/// Pick the most specific message out of a provider error body.
///
/// Auth endpoints answer with `msg` or `error_description`, table endpoints
/// with `message`; older deployments use a bare `error` string.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(Value::String(s)) = map.get(key) {
                if !s.trim().is_empty() {
                    return s.clone();
                }
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_provider_url;

    #[test]
    fn test_message_prefers_msg_field() {
        let body = r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#;
        assert_eq!(
            extract_error_message(StatusCode::UNPROCESSABLE_ENTITY, body),
            "User already registered"
        );
    }

    #[test]
    fn test_message_falls_back_through_fields() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            extract_error_message(StatusCode::BAD_REQUEST, body),
            "Invalid login credentials"
        );
        let body = r#"{"code":"42501","message":"new row violates row-level security policy"}"#;
        assert_eq!(
            extract_error_message(StatusCode::FORBIDDEN, body),
            "new row violates row-level security policy"
        );
    }

    #[test]
    fn test_message_from_plain_text_or_status() {
        assert_eq!(extract_error_message(StatusCode::BAD_GATEWAY, " upstream down \n"), "upstream down");
        assert_eq!(extract_error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let config = ProviderConfig::new(parse_provider_url("https://p.example/proxy").unwrap(), "k");
        let http = ProviderHttp::new(&config).unwrap();
        assert_eq!(
            http.endpoint("rest/v1/publications").unwrap().as_str(),
            "https://p.example/proxy/rest/v1/publications"
        );
    }
}
