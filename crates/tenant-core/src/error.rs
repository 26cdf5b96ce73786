//! Domain errors

use thiserror::Error;

use crate::domain::ResourceClass;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Workspace not found: {0}")]
    TenantNotFound(String),

    #[error("Workspace billing is deactivated. Update your payment method to restore access.")]
    BillingDeactivated { workspace_id: String },

    #[error("{message}")]
    QuotaExceeded {
        resource: ResourceClass,
        message: String,
    },

    #[error("Shard {shard} unavailable: {reason}")]
    ShardUnavailable { shard: usize, reason: String },

    #[error("Webhook signature verification failed: {0}")]
    WebhookVerificationFailed(String),

    #[error("Webhook processing error: {0}")]
    WebhookProcessing(String),

    #[error("Billing log write failed for workspace {workspace_id}: {reason}")]
    BillingLogWriteFailed { workspace_id: String, reason: String },

    #[error("Unknown plan: {0}")]
    InvalidPlan(String),

    #[error("Unknown resource class: {0}")]
    InvalidResource(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Infrastructure failures the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::ShardUnavailable { .. })
    }

    /// Enforcement outcomes that must abort the caller's write.
    pub fn is_enforcement(&self) -> bool {
        matches!(
            self,
            DomainError::TenantNotFound(_)
                | DomainError::BillingDeactivated { .. }
                | DomainError::QuotaExceeded { .. }
        )
    }
}
