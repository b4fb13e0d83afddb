use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0} is required")]
    Missing(&'static str),

    #[error("Invalid provider URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Connection settings for the hosted auth and table-store provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub url: Url,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Extra attempts granted to idempotent reads (user lookup, select)
    pub read_retries: u32,
    pub retry_backoff_ms: u64,
    pub publications_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// `["*"]` means any origin
    pub cors_origins: Vec<String>,
}

impl ProviderConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_READ_RETRIES: u32 = 2;
    pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;
    pub const DEFAULT_PUBLICATIONS_TABLE: &'static str = "publications";

    pub fn new(url: Url, api_key: impl Into<String>) -> Self {
        Self {
            url,
            api_key: api_key.into(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            read_retries: Self::DEFAULT_READ_RETRIES,
            retry_backoff_ms: Self::DEFAULT_RETRY_BACKOFF_MS,
            publications_table: Self::DEFAULT_PUBLICATIONS_TABLE.to_string(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: "static".to_string(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl SecurityConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

impl AppConfig {
    /// Build the process configuration from environment variables.
    ///
    /// Provider URL and key are mandatory; everything else has a default that
    /// individual variables can override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let raw_url = first_env(&["PROVIDER_URL", "SUPABASE_URL"])
            .ok_or(ConfigError::Missing("PROVIDER_URL"))?;
        let api_key = first_env(&["PROVIDER_API_KEY", "SUPABASE_KEY"])
            .ok_or(ConfigError::Missing("PROVIDER_API_KEY"))?;
        let url = parse_provider_url(&raw_url)?;

        Ok(Self {
            environment,
            provider: ProviderConfig::new(url, api_key),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
        }
        .with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        // Provider overrides
        if let Ok(v) = env::var("PROVIDER_TIMEOUT_SECS") {
            self.provider.timeout_secs = v.parse().unwrap_or(self.provider.timeout_secs);
        }
        if let Ok(v) = env::var("PROVIDER_READ_RETRIES") {
            self.provider.read_retries = v.parse().unwrap_or(self.provider.read_retries);
        }
        if let Ok(v) = env::var("PROVIDER_RETRY_BACKOFF_MS") {
            self.provider.retry_backoff_ms = v.parse().unwrap_or(self.provider.retry_backoff_ms);
        }
        if let Ok(v) = env::var("PUBLICATIONS_TABLE") {
            if !v.trim().is_empty() {
                self.provider.publications_table = v.trim().to_string();
            }
        }

        // Server overrides
        if let Ok(v) = env::var("HOST") {
            if !v.trim().is_empty() {
                self.server.host = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("STATIC_DIR") {
            self.server.static_dir = v;
        }

        // Security overrides
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = parse_origins(&v);
        }

        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Parse the provider base URL, keeping a trailing slash so relative joins
/// stay under any path prefix.
pub fn parse_provider_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults() {
        let url = parse_provider_url("https://abc.example.co").unwrap();
        let provider = ProviderConfig::new(url, "anon-key");
        assert_eq!(provider.timeout(), Duration::from_secs(10));
        assert_eq!(provider.read_retries, 2);
        assert_eq!(provider.publications_table, "publications");
    }

    #[test]
    fn test_server_defaults_listen_on_5000() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 5000);
        assert_eq!(server.host, "0.0.0.0");
    }

    #[test]
    fn test_provider_url_gets_trailing_slash() {
        let url = parse_provider_url("https://abc.example.co/base").unwrap();
        assert_eq!(url.as_str(), "https://abc.example.co/base/");
        assert_eq!(
            url.join("auth/v1/user").unwrap().as_str(),
            "https://abc.example.co/base/auth/v1/user"
        );
    }

    #[test]
    fn test_invalid_provider_url() {
        assert!(matches!(
            parse_provider_url("not a url"),
            Err(ConfigError::InvalidUrl(_, _))
        ));
    }

    #[test]
    fn test_cors_origins() {
        assert!(SecurityConfig::default().allows_any_origin());
        let restricted = SecurityConfig {
            cors_origins: parse_origins("https://a.example, https://b.example,"),
        };
        assert_eq!(restricted.cors_origins.len(), 2);
        assert!(!restricted.allows_any_origin());
    }
}
