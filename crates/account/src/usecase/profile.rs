use std::sync::Arc;

use app_core::error::AppError;
use app_core::store::{RetryPolicy, StoreError, create_or_get};
use async_trait::async_trait;
use validator::Validate;

use super::cache::ProfileCache;
use crate::domain::entity::identity::Identity;
use crate::domain::entity::profile::{NewProfile, ProfileUpdatePayload, UserProfile};
use crate::domain::inout::prelude::*;
use crate::outbound::provider::AuthProvider;
use crate::outbound::repository::ProfileRepository;

const NOTHING_TO_UPDATE_MSG: &str = "Provide a full name or an avatar url to update";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProfileUseCase: Send + Sync {
    /// Returns the profile row of `identity`, creating it when absent.
    ///
    /// `None` means the profile is unavailable right now; it never means the
    /// identity is invalid.
    async fn ensure_profile(&self, identity: &Identity) -> Option<UserProfile>;
    async fn current_profile(&self, input: GetCurrentProfileInput) -> Result<GetCurrentProfileOutput, AppError>;
    async fn update_profile(&self, input: UpdateProfileInput) -> Result<UpdateProfileOutput, AppError>;
    async fn forget_session(&self, session_key: &str);
}

#[derive(Clone)]
pub struct ProfileService {
    retry: RetryPolicy,
    cache: ProfileCache,
    auth: Arc<dyn AuthProvider>,
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(
        retry: RetryPolicy,
        cache: ProfileCache,
        auth: Arc<dyn AuthProvider>,
        repo: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self { retry, cache, auth, repo }
    }

    /// Session, then identity, then profile. Any missing link yields `None`.
    async fn fetch_current(&self, access_token: &str) -> Option<UserProfile> {
        let session = match self.auth.get_session(access_token).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::debug!("No active session, profile unavailable");
                return None;
            },
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read session");
                return None;
            },
        };

        let identity = match self.auth.get_user(access_token).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                tracing::warn!(user_id = session.user_id, "Auth provider returned no user for session");
                return None;
            },
            Err(err) => {
                tracing::warn!(user_id = session.user_id, error = %err, "Failed to load auth user");
                return None;
            },
        };

        if identity.id != session.user_id {
            tracing::warn!(session_user = session.user_id, identity = identity.id, "Session and auth user disagree");
            return None;
        }

        self.ensure_profile(&identity).await
    }
}

#[async_trait]
impl ProfileUseCase for ProfileService {
    async fn ensure_profile(&self, identity: &Identity) -> Option<UserProfile> {
        match self.repo.find_by_id(&identity.id).await {
            Ok(Some(profile)) => return Some(profile),
            Ok(None) | Err(StoreError::NotFound(_)) => {
                tracing::info!(user_id = identity.id, "No profile row yet, creating one");
            },
            Err(err) if err.is_transient() => {
                tracing::warn!(user_id = identity.id, error = %err, "Profile lookup failed, attempting create");
            },
            Err(err) => {
                tracing::error!(user_id = identity.id, error = %err, "Profile lookup failed");
                return None;
            },
        }

        let candidate = NewProfile::from_identity(identity);
        let repo = &self.repo;
        let candidate = &candidate;
        let id = identity.id.as_str();

        create_or_get(&self.retry, move || repo.insert(candidate), move || repo.find_by_id(id)).await
    }

    async fn current_profile(&self, input: GetCurrentProfileInput) -> Result<GetCurrentProfileOutput, AppError> {
        let svc = self.clone();
        let access_token = input.access_token;

        let profile = self
            .cache
            .get_or_fetch(&input.session_key, input.force_refresh, move || async move {
                svc.fetch_current(&access_token).await
            })
            .await;

        Ok(GetCurrentProfileOutput { profile })
    }

    async fn update_profile(&self, input: UpdateProfileInput) -> Result<UpdateProfileOutput, AppError> {
        input.validate()?;

        if input.full_name.is_none() && input.avatar_url.is_none() {
            return Err(AppError::ValidationStr(NOTHING_TO_UPDATE_MSG.to_string()));
        }

        let profile = self
            .repo
            .update(ProfileUpdatePayload {
                id: input.user_id.clone(),
                full_name: input.full_name,
                avatar_url: input.avatar_url,
            })
            .await?;

        self.cache.invalidate(&input.session_key);

        tracing::info!("Profile updated successfully for user: {}", input.user_id);

        Ok(UpdateProfileOutput { profile })
    }

    async fn forget_session(&self, session_key: &str) {
        self.cache.invalidate(session_key);
    }
}
