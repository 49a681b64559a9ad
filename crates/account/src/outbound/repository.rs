use app_core::store::StoreError;
use async_trait::async_trait;

use crate::domain::entity::profile::{NewProfile, ProfileUpdatePayload, UserProfile};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProfileRepository: Send + Sync {
    /// Finds the profile row with the given identity id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(UserProfile))` if the row exists.
    /// * `Ok(None)` if it does not.
    /// * `Err(StoreError)` if the lookup itself failed.
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Inserts a new profile row.
    ///
    /// Fails with `StoreError::Conflict` when a row with the same id already
    /// exists; the existing row is left untouched.
    async fn insert(&self, profile: &NewProfile) -> Result<UserProfile, StoreError>;

    /// Applies the present fields of `payload` and returns the updated row.
    ///
    /// Fails with `StoreError::NotFound` when no row has the given id.
    async fn update(&self, payload: ProfileUpdatePayload) -> Result<UserProfile, StoreError>;

    /// Deletes the row with the given id. Deleting a missing row succeeds.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
