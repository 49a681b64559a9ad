use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::domain::entity::profile::UserProfile;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

type SharedFetch = Shared<BoxFuture<'static, Option<UserProfile>>>;

struct CachedProfile {
    profile: UserProfile,
    fetched_at: Instant,
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CachedProfile>,
    in_flight: HashMap<String, InFlight>,
    next_id: u64,
}

/// Per-session profile cache with a fixed TTL.
///
/// Concurrent lookups of one key share a single fetch. Failed fetches
/// (`None`) are handed to every waiter but never stored. Storing a result
/// purges every expired entry, so only sessions seen within one TTL are kept.
#[derive(Clone)]
pub struct ProfileCache {
    state: Arc<Mutex<CacheState>>,
    ttl: Duration,
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ProfileCache {
    pub fn new(ttl: Duration) -> Self {
        Self { state: Arc::new(Mutex::new(CacheState::default())), ttl }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached profile for `key` if still fresh, otherwise joins or
    /// starts a fetch. `force_refresh` skips the freshness check.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, force_refresh: bool, fetch: F) -> Option<UserProfile>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<UserProfile>> + Send + 'static,
    {
        let shared = {
            let mut state = self.lock();

            if !force_refresh {
                if let Some(cached) = state.entries.get(key) {
                    let age = cached.fetched_at.elapsed();
                    if age < self.ttl {
                        tracing::debug!(session = key, age_ms = age.as_millis() as u64, "Profile cache hit");
                        return Some(cached.profile.clone());
                    }
                    tracing::debug!(session = key, "Profile cache entry expired");
                }
            }

            if let Some(in_flight) = state.in_flight.get(key) {
                tracing::debug!(session = key, "Joining in-flight profile fetch");
                in_flight.fetch.clone()
            } else {
                tracing::debug!(session = key, "Profile cache miss, fetching");
                state.next_id += 1;
                let id = state.next_id;

                let cache = self.clone();
                let owned_key = key.to_string();
                let pending = fetch();
                let fetch = async move {
                    let result = pending.await;
                    cache.complete(&owned_key, id, result.as_ref());
                    result
                }
                .boxed()
                .shared();

                state.in_flight.insert(key.to_string(), InFlight { id, fetch: fetch.clone() });
                fetch
            }
        };

        shared.await
    }

    fn complete(&self, key: &str, id: u64, result: Option<&UserProfile>) {
        let mut state = self.lock();

        // An invalidation while fetching replaced or dropped our slot.
        if state.in_flight.get(key).map(|f| f.id) != Some(id) {
            return;
        }
        state.in_flight.remove(key);

        match result {
            Some(profile) => {
                let ttl = self.ttl;
                let before = state.entries.len();
                state.entries.retain(|_, cached| cached.fetched_at.elapsed() < ttl);
                let purged = before - state.entries.len();
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired profile cache entries");
                }

                state
                    .entries
                    .insert(key.to_string(), CachedProfile { profile: profile.clone(), fetched_at: Instant::now() });
            },
            None => {
                state.entries.remove(key);
            },
        }
    }

    pub fn invalidate(&self, key: &str) {
        let mut state = self.lock();
        state.entries.remove(key);
        state.in_flight.remove(key);
        tracing::debug!(session = key, "Invalidated profile cache entry");
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.lock().entries.len()
    }
}
