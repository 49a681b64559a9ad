//! Typed persistence errors and a retrying create-or-get helper.

use std::future::Future;
use std::time::Duration;

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Outcome classes of a persistence call.
///
/// Callers branch on the variant, never on the backend message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Store temporarily unavailable: {0}")]
    Transient(String),

    #[error("Store operation failed: {0}")]
    Fatal(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Constraint violations reported by the database driver.
impl From<SqlErr> for StoreError {
    fn from(err: SqlErr) -> Self {
        match err {
            SqlErr::UniqueConstraintViolation(msg) => StoreError::Conflict(msg),
            other => StoreError::Fatal(other.to_string()),
        }
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        if let Some(sql_err) = err.sql_err() {
            return sql_err.into();
        }

        match &err {
            DbErr::RecordNotFound(msg) => StoreError::NotFound(msg.clone()),
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => StoreError::Transient(err.to_string()),
            DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) | DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
                if is_transient_sqlx(sqlx_err) =>
            {
                StoreError::Transient(err.to_string())
            },
            _ => StoreError::Fatal(err.to_string()),
        }
    }
}

fn is_transient_sqlx(err: &sea_orm::sqlx::Error) -> bool {
    use sea_orm::sqlx::Error;

    matches!(err, Error::Io(_) | Error::PoolTimedOut | Error::PoolClosed | Error::WorkerCrashed)
}

/// Bounded exponential backoff between create attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_millis(500), max_delay: Duration::from_secs(4) }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay, max_delay }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent).min(self.max_delay)
    }
}

/// Creates a record, falling back to reading it when it already exists.
///
/// - `Conflict` re-reads immediately and stops as soon as the record is found.
/// - `Transient` waits according to `policy` and tries again.
/// - `NotFound` and `Fatal` stop the attempts early.
///
/// Once attempts are exhausted, a single final read covers a concurrent
/// creator that succeeded while ours failed. Returns `None` when the record
/// is still not available.
pub async fn create_or_get<T, C, CFut, G, GFut>(policy: &RetryPolicy, mut create: C, mut get: G) -> Option<T>
where
    C: FnMut() -> CFut,
    CFut: Future<Output = Result<T, StoreError>>,
    G: FnMut() -> GFut,
    GFut: Future<Output = Result<Option<T>, StoreError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match create().await {
            Ok(created) => return Some(created),
            Err(StoreError::Conflict(msg)) => {
                tracing::info!(attempt, "Record already exists, reading it back: {}", msg);
                match get().await {
                    Ok(Some(existing)) => return Some(existing),
                    Ok(None) => tracing::warn!(attempt, "Conflict reported but record is not readable yet"),
                    Err(err) => tracing::warn!(attempt, error = %err, "Re-read after conflict failed"),
                }
            },
            Err(err @ StoreError::Transient(_)) => {
                tracing::warn!(attempt, max_attempts, error = %err, "Create attempt failed");
            },
            Err(err) => {
                tracing::error!(attempt, error = %err, "Create attempt failed permanently");
                break;
            },
        }

        if attempt < max_attempts {
            tokio::time::sleep(policy.delay_for(attempt)).await;
        }
    }

    match get().await {
        Ok(Some(existing)) => Some(existing),
        Ok(None) => {
            tracing::error!("Record could not be created after {} attempts", max_attempts);
            None
        },
        Err(err) => {
            tracing::error!(error = %err, "Final read after failed create attempts failed");
            None
        },
    }
}
