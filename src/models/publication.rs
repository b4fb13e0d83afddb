use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::models::User;

/// Publications stay listable for this many days after creation
pub const PUBLICATION_TTL_DAYS: i64 = 28;

pub const REQUIRED_FIELDS: [&str; 5] = ["title", "content", "language", "publish_period", "pub_code"];

/// Column names used when querying the publications table
pub mod columns {
    pub const ID: &str = "id";
    pub const LANGUAGE: &str = "language";
    pub const CREATED_AT: &str = "created_at";
    pub const EXPIRES_AT: &str = "expires_at";
}

pub fn expires_at_for(created: DateTime<Utc>) -> DateTime<Utc> {
    created + Duration::days(PUBLICATION_TTL_DAYS)
}

/// Validated client fields for a new publication.
///
/// Anything the client sends beyond these (including `user_id` or
/// `user_email`) is discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationInput {
    pub title: String,
    pub content: String,
    pub language: String,
    pub publish_period: Value,
    pub pub_code: Value,
    pub cover_image: Option<Value>,
    pub style: Option<Value>,
}

/// Row inserted into the store. `id` and `created_at` are assigned store-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPublication {
    pub user_id: String,
    pub user_email: Option<String>,
    pub title: String,
    pub content: String,
    pub language: String,
    pub publish_period: Value,
    pub pub_code: Value,
    pub cover_image: Option<Value>,
    pub style: Option<Value>,
    pub expires_at: DateTime<Utc>,
}

impl PublicationInput {
    pub fn from_json(body: Value) -> Result<Self, ApiError> {
        let Value::Object(mut map) = body else {
            return Err(ApiError::invalid_input("Request body must be a JSON object"));
        };

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| is_absent(map.get(**field)))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::missing_fields(missing));
        }

        Ok(Self {
            title: take_string(&mut map, "title")?,
            content: take_string(&mut map, "content")?,
            language: take_string(&mut map, "language")?,
            publish_period: map.remove("publish_period").unwrap_or(Value::Null),
            pub_code: map.remove("pub_code").unwrap_or(Value::Null),
            cover_image: take_optional(&mut map, "cover_image"),
            style: take_optional(&mut map, "style"),
        })
    }

    /// Stamp ownership and expiry from the resolved identity and server clock
    pub fn into_record(self, owner: &User, now: DateTime<Utc>) -> NewPublication {
        NewPublication {
            user_id: owner.id.clone(),
            user_email: owner.email.clone(),
            title: self.title,
            content: self.content,
            language: self.language,
            publish_period: self.publish_period,
            pub_code: self.pub_code,
            cover_image: self.cover_image,
            style: self.style,
            expires_at: expires_at_for(now),
        }
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn take_string(map: &mut Map<String, Value>, field: &str) -> Result<String, ApiError> {
    match map.remove(field) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(ApiError::invalid_input(format!("Field '{}' must be a string", field))),
    }
}

fn take_optional(map: &mut Map<String, Value>, field: &str) -> Option<Value> {
    map.remove(field).filter(|v| !v.is_null())
}
