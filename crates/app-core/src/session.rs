//! Verification of access tokens issued by the Supabase auth server.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session has expired")]
    Expired,

    #[error("Invalid session token")]
    InvalidToken,
}

/// Claims carried by a Supabase access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    /// Key identifying the provider session, falling back to the subject for
    /// tokens minted without a `session_id` claim.
    pub fn session_key(&self) -> &str {
        self.session_id.as_deref().unwrap_or(&self.sub)
    }
}

/// A verified session attached to the request by the session middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub claims: Claims,
    pub access_token: String,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, SessionError>;
}

/// HS256 verifier using the project's JWT secret.
pub struct SupabaseJwtVerifier {
    secret: String,
    audience: String,
}

impl SupabaseJwtVerifier {
    pub fn new(secret: String, audience: String) -> Self {
        Self { secret, audience }
    }
}

impl SessionVerifier for SupabaseJwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_ref()), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::InvalidToken,
            })
    }
}
