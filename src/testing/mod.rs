//! In-memory stand-ins for the hosted provider, used by unit and
//! integration tests. The backend emulates the store's owner-only row policy
//! and assigns `id` / `created_at` the way the hosted table store does.
//! `StubProvider` serves canned HTTP answers for the reqwest adapters.

mod stub_provider;

pub use stub_provider::{RecordedRequest, StubProvider, STUB_API_KEY};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::filter::Filter;
use crate::models::{Credentials, Session, User};
use crate::provider::{CredentialProvider, ProviderError, RecordStore};
use crate::state::AppState;

/// Clock pinned to an instant that tests move explicitly
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Mutex::new(at))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *lock(&self.0) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.0);
        *now += by;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Default instant for fresh backends: 2026-10-17T12:00:00Z
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, User>,
    tables: HashMap<String, Vec<Value>>,
}

pub struct InMemoryBackend {
    inner: Mutex<Inner>,
    clock: Arc<MutableClock>,
    unavailable: AtomicBool,
    store_unavailable: AtomicBool,
    signup_returns_no_user: AtomicBool,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock: Arc::new(MutableClock::new(fixture_time())),
            unavailable: AtomicBool::new(false),
            store_unavailable: AtomicBool::new(false),
            signup_returns_no_user: AtomicBool::new(false),
        }
    }

    pub fn clock(&self) -> Arc<MutableClock> {
        self.clock.clone()
    }

    /// Make every call fail as if the provider timed out
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make sign-up succeed without returning a user (pending confirmation)
    pub fn set_signup_returns_no_user(&self, value: bool) {
        self.signup_returns_no_user.store(value, Ordering::SeqCst);
    }

    /// Register an account and issue a token for it directly
    pub fn seed_user(&self, email: &str, password: &str) -> (User, String) {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        let token = format!("token-{}", Uuid::new_v4().simple());
        let mut inner = lock(&self.inner);
        inner.accounts.insert(
            email.to_string(),
            Account { user: user.clone(), password: password.to_string() },
        );
        inner.tokens.insert(token.clone(), user.clone());
        (user, token)
    }

    /// Every stored row, expired or not
    pub fn rows(&self, table: &str) -> Vec<Value> {
        lock(&self.inner).tables.get(table).cloned().unwrap_or_default()
    }

    /// Fail table-store calls only; auth keeps working
    pub fn set_store_unavailable(&self, unavailable: bool) {
        self.store_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Application state wired to this backend and its clock
    pub fn app_state(self: &Arc<Self>) -> AppState {
        AppState::new(self.clone(), self.clone(), self.clock.clone())
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(ProviderError::Timeout)
        } else {
            Ok(())
        }
    }

    fn check_store_available(&self) -> Result<(), ProviderError> {
        self.check_available()?;
        if self.store_unavailable.load(Ordering::SeqCst) {
            Err(ProviderError::Rejected { status: 503, message: "relation pool exhausted".to_string() })
        } else {
            Ok(())
        }
    }

    fn caller(&self, access_token: &str) -> Result<User, ProviderError> {
        lock(&self.inner)
            .tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected { status: 401, message: "JWT expired".to_string() })
    }
}

#[async_trait]
impl CredentialProvider for InMemoryBackend {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<User>, ProviderError> {
        self.check_available()?;
        if self.signup_returns_no_user.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let mut inner = lock(&self.inner);
        if inner.accounts.contains_key(&credentials.email) {
            return Err(ProviderError::Rejected {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: Some(credentials.email.clone()),
        };
        inner.accounts.insert(
            credentials.email.clone(),
            Account { user: user.clone(), password: credentials.password.clone() },
        );
        Ok(Some(user))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, ProviderError> {
        self.check_available()?;
        let mut inner = lock(&self.inner);
        let account = inner
            .accounts
            .get(&credentials.email)
            .filter(|a| a.password == credentials.password)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;

        let access_token = format!("token-{}", Uuid::new_v4().simple());
        inner.tokens.insert(access_token.clone(), account.user.clone());

        let expires_in = 3600;
        let mut fields = Map::new();
        fields.insert("token_type".to_string(), json!("bearer"));
        fields.insert("expires_in".to_string(), json!(expires_in));
        fields.insert("expires_at".to_string(), json!(self.clock.utc().timestamp() + expires_in));
        fields.insert("refresh_token".to_string(), json!(Uuid::new_v4().simple().to_string()));
        fields.insert(
            "user".to_string(),
            json!({ "id": account.user.id, "email": account.user.email }),
        );
        Ok(Session { access_token, fields })
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, ProviderError> {
        self.check_available()?;
        Ok(lock(&self.inner).tokens.get(access_token).cloned())
    }
}

#[async_trait]
impl RecordStore for InMemoryBackend {
    async fn insert(&self, table: &str, row: Value, access_token: &str) -> Result<Value, ProviderError> {
        self.check_store_available()?;
        let caller = self.caller(access_token)?;
        let Value::Object(mut row) = row else {
            return Err(ProviderError::Rejected { status: 400, message: "row must be an object".to_string() });
        };
        if row.get("user_id").and_then(Value::as_str) != Some(caller.id.as_str()) {
            return Err(ProviderError::Rejected {
                status: 403,
                message: "new row violates row-level security policy".to_string(),
            });
        }

        row.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        row.insert("created_at".to_string(), json!(self.clock.utc()));
        let stored = Value::Object(row);
        lock(&self.inner)
            .tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn select(&self, table: &str, filter: &Filter, access_token: &str) -> Result<Vec<Value>, ProviderError> {
        self.check_store_available()?;
        self.caller(access_token)?;
        Ok(filter.apply(self.rows(table)))
    }

    async fn delete(&self, table: &str, filter: &Filter, access_token: &str) -> Result<Vec<Value>, ProviderError> {
        self.check_store_available()?;
        let caller = self.caller(access_token)?;
        let mut inner = lock(&self.inner);
        let rows = inner.tables.entry(table.to_string()).or_default();

        // Owner-only policy: rows owned by others are invisible to the delete
        let (removed, kept): (Vec<Value>, Vec<Value>) = rows.drain(..).partition(|row| {
            filter.matches(row) && row.get("user_id").and_then(Value::as_str) == Some(caller.id.as_str())
        });
        *rows = kept;
        Ok(removed)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_only_touches_callers_rows() {
        let backend = InMemoryBackend::new();
        let (alice, alice_token) = backend.seed_user("alice@x.com", "pw");
        let (_, bob_token) = backend.seed_user("bob@x.com", "pw");

        let row = backend
            .insert("publications", json!({"user_id": alice.id, "language": "en"}), &alice_token)
            .await
            .unwrap();
        let by_id = Filter::new().eq("id", row["id"].clone());

        assert!(backend.delete("publications", &by_id, &bob_token).await.unwrap().is_empty());
        assert_eq!(backend.rows("publications").len(), 1);
        assert_eq!(backend.delete("publications", &by_id, &alice_token).await.unwrap().len(), 1);
        assert!(backend.rows("publications").is_empty());
    }

    #[tokio::test]
    async fn insert_rejects_foreign_owner() {
        let backend = InMemoryBackend::new();
        let (_, token) = backend.seed_user("alice@x.com", "pw");
        let err = backend
            .insert("publications", json!({"user_id": "someone-else"}), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { status: 403, .. }));
    }

    #[test]
    fn mutable_clock_advances() {
        let clock = MutableClock::new(fixture_time());
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.utc(), fixture_time() + Duration::minutes(5));
    }
}
