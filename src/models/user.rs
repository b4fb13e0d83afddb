use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Identity resolved by the credential provider. Never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Pull a user out of a provider payload that is either the user object
    /// itself or a session wrapping it under `user`.
    pub fn from_provider_payload(payload: &Value) -> Option<User> {
        let candidate = match payload.get("user") {
            Some(user) if user.is_object() => user,
            _ => payload,
        };
        let user: User = serde_json::from_value(candidate.clone()).ok()?;
        if user.id.trim().is_empty() {
            None
        } else {
            Some(user)
        }
    }
}

/// Session issued by the provider on password sign-in.
///
/// Only `access_token` is typed; every other key (including explicit nulls)
/// stays in `fields` so the payload relays to the client exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Session {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Raw `{email, password}` body as posted to /register and /token
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsInput {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialsInput {
    /// Both fields must be present and non-blank
    pub fn validate(self) -> Result<Credentials, ApiError> {
        let mut missing = Vec::new();
        let email = non_blank(self.email);
        let password = non_blank(self.password);
        if email.is_none() {
            missing.push("email".to_string());
        }
        if password.is_none() {
            missing.push("password".to_string());
        }

        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(ApiError::InvalidInput {
                message: "Email and password are required".to_string(),
                missing,
            }),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_bare_user_payload() {
        let payload = json!({"id": "u-1", "email": "a@x.com", "role": "authenticated"});
        let user = User::from_provider_payload(&payload).unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_user_from_session_payload() {
        let payload = json!({"access_token": "t", "user": {"id": "u-2", "email": "b@x.com"}});
        assert_eq!(User::from_provider_payload(&payload).unwrap().id, "u-2");
    }

    #[test]
    fn test_user_absent_when_no_id() {
        assert!(User::from_provider_payload(&json!({})).is_none());
        assert!(User::from_provider_payload(&json!({"id": ""})).is_none());
        assert!(User::from_provider_payload(&json!({"user": null})).is_none());
    }

    #[test]
    fn test_session_round_trips_unknown_fields() {
        let payload = json!({
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_790_000_000,
            "refresh_token": "rt",
            "user": {"id": "u-1"},
            "provider_token": null,
            "weak_password": {"reasons": []}
        });
        let session: Session = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(session.access_token, "at");
        assert_eq!(serde_json::to_value(&session).unwrap(), payload);
    }

    #[test]
    fn test_session_keeps_explicit_nulls() {
        let payload = json!({
            "access_token": "at",
            "token_type": "bearer",
            "refresh_token": null,
            "user": null
        });
        let session: Session = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(session.field("refresh_token"), Some(&Value::Null));
        assert_eq!(serde_json::to_value(&session).unwrap(), payload);
    }

    #[test]
    fn test_credentials_validation() {
        let ok = CredentialsInput {
            email: Some("a@x.com".into()),
            password: Some("pw".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.email, "a@x.com");

        let err = CredentialsInput {
            email: Some("  ".into()),
            password: None,
        }
        .validate()
        .unwrap_err();
        match err {
            ApiError::InvalidInput { missing, .. } => assert_eq!(missing, vec!["email", "password"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials { email: "a@x.com".into(), password: "hunter2".into() };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
