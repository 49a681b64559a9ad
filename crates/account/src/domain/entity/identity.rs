use chrono::{DateTime, Utc};
use serde_json::Value;

/// A user as known to the auth provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub metadata: Value,
}

impl Identity {
    pub fn new(id: String, email: Option<String>, metadata: Value) -> Self {
        Self { id, email, metadata }
    }

    /// Returns a non-blank string field of the provider metadata.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// A live provider session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub session_key: String,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Tokens and identity returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub identity: Identity,
}
