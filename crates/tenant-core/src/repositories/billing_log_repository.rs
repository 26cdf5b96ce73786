//! Billing log repository trait (port)

use async_trait::async_trait;

use crate::domain::BillingLogEntry;
use crate::error::DomainError;

/// Append-only: there is deliberately no update or delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingLogRepository: Send + Sync {
    async fn append(&self, entry: &BillingLogEntry) -> Result<(), DomainError>;
    async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<BillingLogEntry>, DomainError>;
}
