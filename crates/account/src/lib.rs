mod domain;
mod inbound;
mod outbound;
mod usecase;

use std::sync::Arc;
use std::time::Duration;

use app_core::config::Config;
use app_core::error::AppError;
use app_core::session::SessionVerifier;
use app_core::store::RetryPolicy;
use app_core::supabase::GoTrueClient;
pub use inbound::router::create_router;
pub use inbound::state::AccountState;
use sea_orm::DatabaseConnection;

use crate::outbound::orm::ProfileORM;
use crate::outbound::provider::SupabaseAuth;
use crate::usecase::authn::AuthnService;
use crate::usecase::cache::{DEFAULT_TTL, ProfileCache};
use crate::usecase::diagnostics::DiagnosticsService;
use crate::usecase::profile::ProfileService;

pub struct Dependency {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub verifier: Arc<dyn SessionVerifier>,
    pub gotrue: GoTrueClient,
}

fn retry_policy(config: &Config) -> Result<RetryPolicy, AppError> {
    let default = RetryPolicy::default();

    Ok(RetryPolicy::new(
        config.get_or("profile.retry.max_attempts", default.max_attempts)?,
        Duration::from_millis(config.get_or("profile.retry.base_delay_ms", default.base_delay.as_millis() as u64)?),
        Duration::from_millis(config.get_or("profile.retry.max_delay_ms", default.max_delay.as_millis() as u64)?),
    ))
}

pub fn new(dep: Dependency) -> Result<AccountState, AppError> {
    let ttl = Duration::from_secs(dep.config.get_or("profile.cache_ttl_secs", DEFAULT_TTL.as_secs())?);
    let retry = retry_policy(&dep.config)?;

    let auth = Arc::new(SupabaseAuth::new(dep.verifier, dep.gotrue));
    let repo = Arc::new(ProfileORM::new(dep.db));

    let profile_svc = Arc::new(ProfileService::new(retry, ProfileCache::new(ttl), auth.clone(), repo.clone()));
    let authn_svc = Arc::new(AuthnService::new(auth.clone(), profile_svc.clone()));
    let diagnostics_svc = Arc::new(DiagnosticsService::new(auth, repo, profile_svc.clone()));

    tracing::info!(ttl_secs = ttl.as_secs(), max_attempts = retry.max_attempts, "Account module initialized");

    Ok(AccountState::new(dep.config, authn_svc, profile_svc, diagnostics_svc))
}
