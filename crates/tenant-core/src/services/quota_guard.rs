//! Count-then-check helper used in front of resource-creating writes

use std::sync::Arc;

use tracing::debug;

use crate::domain::ResourceClass;
use crate::error::DomainError;
use crate::services::quota_enforcer::QuotaEnforcer;
use crate::services::usage_aggregator::{bytes_to_mb, UsageAggregator};

/// Reads a fresh count and asks the enforcer. The caller's create happens
/// afterwards as a separate write, so two concurrent creators racing for the
/// last slot can both pass: caps are soft by one per concurrent creator.
pub struct QuotaGuard {
    aggregator: Arc<UsageAggregator>,
    enforcer: Arc<QuotaEnforcer>,
}

impl QuotaGuard {
    pub fn new(aggregator: Arc<UsageAggregator>, enforcer: Arc<QuotaEnforcer>) -> Self {
        Self { aggregator, enforcer }
    }

    /// Returns the count the decision was made on.
    pub async fn ensure_can_create(&self, workspace_id: &str, resource: ResourceClass) -> Result<u64, DomainError> {
        let current = self.aggregator.current_count(workspace_id, resource).await?;
        self.enforcer.assert_allowed(workspace_id, resource, current).await?;
        debug!(workspace_id, resource = %resource, current, "Create permitted");
        Ok(current)
    }

    /// Per-file cap first, then stored bytes plus the new file against the
    /// plan's total storage. Returns the stored MB the decision was made on.
    pub async fn ensure_can_upload(&self, workspace_id: &str, size_bytes: u64) -> Result<u64, DomainError> {
        self.enforcer.assert_upload_size(workspace_id, size_bytes).await?;
        let stored = self.aggregator.stored_bytes(workspace_id).await?;
        self.enforcer
            .assert_storage_available(workspace_id, stored, size_bytes)
            .await?;
        debug!(workspace_id, stored, size_bytes, "Upload permitted");
        Ok(bytes_to_mb(stored))
    }
}
