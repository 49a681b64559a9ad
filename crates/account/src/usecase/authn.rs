use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;
use validator::Validate;

use super::profile::ProfileUseCase;
use crate::domain::inout::prelude::*;
use crate::outbound::provider::AuthProvider;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AuthnUseCase: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<LoginOutput, AppError>;
    async fn oauth_login(&self, input: OAuthLoginInput) -> Result<OAuthLoginOutput, AppError>;
    async fn logout(&self, input: LogoutInput) -> Result<LogoutOutput, AppError>;
}

pub struct AuthnService {
    auth: Arc<dyn AuthProvider>,
    profile: Arc<dyn ProfileUseCase>,
}

impl AuthnService {
    pub fn new(auth: Arc<dyn AuthProvider>, profile: Arc<dyn ProfileUseCase>) -> Self {
        Self { auth, profile }
    }
}

#[async_trait]
impl AuthnUseCase for AuthnService {
    async fn login(&self, input: LoginInput) -> Result<LoginOutput, AppError> {
        input.validate()?;

        let session = self.auth.sign_in_with_password(&input.email, &input.password).await?;

        // A missing profile does not fail the sign-in; the next profile read retries.
        let profile = self.profile.ensure_profile(&session.identity).await;
        if profile.is_none() {
            tracing::warn!(user_id = session.identity.id, "Signed in without a profile row");
        }

        tracing::info!("User logged in successfully: {}", session.identity.id);

        Ok(LoginOutput {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
            profile,
        })
    }

    async fn oauth_login(&self, input: OAuthLoginInput) -> Result<OAuthLoginOutput, AppError> {
        input.validate()?;

        let auth_url = self.auth.sign_in_with_oauth(&input.provider, input.redirect_to).await?;

        Ok(OAuthLoginOutput { auth_url })
    }

    async fn logout(&self, input: LogoutInput) -> Result<LogoutOutput, AppError> {
        self.auth.sign_out(&input.access_token).await?;
        self.profile.forget_session(&input.session_key).await;

        Ok(LogoutOutput { success: true })
    }
}
