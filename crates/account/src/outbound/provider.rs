use std::sync::Arc;

use app_core::error::AppError;
use app_core::session::{Claims, SessionVerifier};
use app_core::supabase::{GoTrueClient, GoTrueUser};
use async_trait::async_trait;
use chrono::DateTime;

use crate::domain::entity::identity::{AuthSession, Identity, Session};

/// The auth provider owning identities and sessions.
///
/// Every call may fail; "no session" and "no user" are `Ok(None)`.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AuthProvider: Send + Sync {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AppError>;
    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AppError>;
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;
    /// Returns the URL the browser must visit to start the OAuth flow.
    async fn sign_in_with_oauth(&self, provider: &str, redirect_to: Option<String>) -> Result<String, AppError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;
}

/// Supabase implementation: sessions are checked locally against the
/// project JWT secret, users come from the GoTrue API.
pub struct SupabaseAuth {
    verifier: Arc<dyn SessionVerifier>,
    gotrue: GoTrueClient,
}

impl SupabaseAuth {
    pub fn new(verifier: Arc<dyn SessionVerifier>, gotrue: GoTrueClient) -> Self {
        Self { verifier, gotrue }
    }

    fn to_session(claims: Claims) -> Session {
        Session {
            user_id: claims.sub.clone(),
            session_key: claims.session_key().to_string(),
            email: claims.email,
            expires_at: DateTime::from_timestamp(claims.exp as i64, 0).unwrap_or_default(),
        }
    }

    fn to_identity(user: GoTrueUser) -> Identity {
        Identity::new(user.id, user.email.filter(|email| !email.is_empty()), user.user_metadata)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, AppError> {
        match self.verifier.verify(access_token) {
            Ok(claims) => Ok(Some(Self::to_session(claims))),
            Err(err) => {
                tracing::debug!("No usable session: {}", err);
                Ok(None)
            },
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AppError> {
        Ok(self.gotrue.get_user(access_token).await?.map(Self::to_identity))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let session = self.gotrue.sign_in_with_password(email, password).await?;

        Ok(AuthSession {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
            identity: Self::to_identity(session.user),
        })
    }

    async fn sign_in_with_oauth(&self, provider: &str, redirect_to: Option<String>) -> Result<String, AppError> {
        Ok(self.gotrue.authorize_url(provider, redirect_to.as_deref())?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        Ok(self.gotrue.sign_out(access_token).await?)
    }
}
