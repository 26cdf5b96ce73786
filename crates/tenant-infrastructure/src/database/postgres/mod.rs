//! PostgreSQL repository implementations

pub mod workspace_repo_impl;
pub mod billing_log_repo_impl;
pub mod usage_repo_impl;
pub mod activity_repo_impl;

pub use workspace_repo_impl::PgWorkspaceRepository;
pub use billing_log_repo_impl::PgBillingLogRepository;
pub use usage_repo_impl::PgUsageRepository;
pub use activity_repo_impl::PgActivityRepository;

use tenant_core::error::DomainError;
use tracing::error;

/// Connectivity failures become `ShardUnavailable` so callers can retry;
/// everything else is a plain database error.
pub(crate) fn db_error(shard: usize, context: &str, e: sqlx::Error) -> DomainError {
    error!(shard, "Database error {}: {}", context, e);
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => DomainError::ShardUnavailable {
            shard,
            reason: e.to_string(),
        },
        other => DomainError::DatabaseError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_errors_are_retryable() {
        let err = db_error(2, "probing", sqlx::Error::PoolTimedOut);
        assert_eq!(
            err,
            DomainError::ShardUnavailable {
                shard: 2,
                reason: sqlx::Error::PoolTimedOut.to_string()
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn query_errors_are_not_retryable() {
        let err = db_error(0, "loading", sqlx::Error::RowNotFound);
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }
}
