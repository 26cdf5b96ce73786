//! Usage counting trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ActivityAction, ResourceClass};
use crate::error::DomainError;

/// Fresh counts scoped to one workspace, read from its assigned shard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Row count of the collection backing `resource`.
    async fn count_resource(&self, workspace_id: &str, resource: ResourceClass) -> Result<u64, DomainError>;

    /// Sum of the `size` field over every activity of `action`.
    async fn sum_activity_bytes(&self, workspace_id: &str, action: ActivityAction) -> Result<u64, DomainError>;

    async fn count_activity_since(
        &self,
        workspace_id: &str,
        action: ActivityAction,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError>;
}
