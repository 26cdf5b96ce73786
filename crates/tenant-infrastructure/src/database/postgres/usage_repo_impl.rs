// ============================================================================
// Tenant Infrastructure - PostgreSQL Usage Repository
// File: crates/tenant-infrastructure/src/database/postgres/usage_repo_impl.rs
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tenant_core::domain::{ActivityAction, ResourceClass};
use tenant_core::error::DomainError;
use tenant_core::repositories::UsageRepository;

use super::db_error;
use crate::shard::ShardRouter;

/// Live counts read from the workspace's own shard. No caching.
pub struct PgUsageRepository {
    router: Arc<ShardRouter<PgPool>>,
}

impl PgUsageRepository {
    pub fn new(router: Arc<ShardRouter<PgPool>>) -> Self {
        Self { router }
    }
}

/// Table backing each row-counted resource.
fn table_for(resource: ResourceClass) -> Option<&'static str> {
    match resource {
        ResourceClass::Projects => Some("projects"),
        ResourceClass::Tasks => Some("tasks"),
        ResourceClass::Teams => Some("teams"),
        ResourceClass::Members => Some("workspace_members"),
        ResourceClass::Boards => Some("boards"),
        ResourceClass::CalendarEvents => Some("calendar_events"),
        ResourceClass::Automations => Some("automations"),
        ResourceClass::Integrations => Some("integrations"),
        ResourceClass::ChatMessages => Some("chat_messages"),
        ResourceClass::Storage
        | ResourceClass::AiRequests
        | ResourceClass::ApiRequests
        | ResourceClass::Analytics => None,
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl UsageRepository for PgUsageRepository {
    async fn count_resource(&self, workspace_id: &str, resource: ResourceClass) -> Result<u64, DomainError> {
        let table = table_for(resource).ok_or_else(|| {
            DomainError::InvalidResource(format!("{} is not counted by rows", resource))
        })?;
        let (shard, pool) = self.router.client_for(workspace_id);

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE workspace_id = $1",
            table
        ))
        .bind(workspace_id)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error(shard, "counting resource", e))?;

        Ok(to_count(count))
    }

    async fn sum_activity_bytes(&self, workspace_id: &str, action: ActivityAction) -> Result<u64, DomainError> {
        let (shard, pool) = self.router.client_for(workspace_id);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM((metadata->>'size')::BIGINT), 0)::BIGINT
            FROM activities
            WHERE workspace_id = $1 AND action = $2
            "#,
        )
        .bind(workspace_id)
        .bind(action.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| db_error(shard, "summing activity bytes", e))?;

        Ok(to_count(total))
    }

    async fn count_activity_since(
        &self,
        workspace_id: &str,
        action: ActivityAction,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let (shard, pool) = self.router.client_for(workspace_id);

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM activities
            WHERE workspace_id = $1 AND action = $2 AND created_at >= $3
            "#,
        )
        .bind(workspace_id)
        .bind(action.as_str())
        .bind(since)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error(shard, "counting activity", e))?;

        Ok(to_count(count))
    }
}
