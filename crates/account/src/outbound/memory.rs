//! In-memory `ProfileRepository` with the uniqueness semantics of the real
//! table, used to exercise races between concurrent callers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use app_core::store::StoreError;
use async_trait::async_trait;
use chrono::Utc;

use super::repository::ProfileRepository;
use crate::domain::entity::profile::{NewProfile, ProfileUpdatePayload, UserProfile};

#[derive(Default)]
pub struct InMemoryProfiles {
    rows: Mutex<HashMap<String, UserProfile>>,
    failure: Mutex<Option<StoreError>>,
    finds: AtomicUsize,
    inserts: AtomicUsize,
}

impl InMemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(profile: UserProfile) -> Self {
        let repo = Self::default();
        repo.rows.lock().unwrap().insert(profile.id.clone(), profile);
        repo
    }

    /// Makes every following call fail with `err`.
    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn row(&self, id: &str) -> Option<UserProfile> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers interleave like real round-trips would.
        tokio::task::yield_now().await;
        self.check()?;
        Ok(self.row(id))
    }

    async fn insert(&self, profile: &NewProfile) -> Result<UserProfile, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.check()?;

        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&profile.id) {
            return Err(StoreError::Conflict(format!("users.id {}", profile.id)));
        }

        let now = Utc::now();
        let row = UserProfile {
            id: profile.id.clone(),
            email: profile.email.clone(),
            full_name: Some(profile.full_name.clone()),
            avatar_url: Some(profile.avatar_url.clone()),
            role: profile.role,
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn update(&self, payload: ProfileUpdatePayload) -> Result<UserProfile, StoreError> {
        self.check()?;

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&payload.id)
            .ok_or_else(|| StoreError::NotFound(format!("users.id {}", payload.id)))?;

        if let Some(full_name) = payload.full_name {
            row.full_name = Some(full_name);
        }
        if let Some(avatar_url) = payload.avatar_url {
            row.avatar_url = Some(avatar_url);
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check()?;
        self.rows.lock().unwrap().remove(id);
        Ok(())
    }
}
