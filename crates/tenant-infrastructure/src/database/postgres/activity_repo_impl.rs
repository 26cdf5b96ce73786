use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use tenant_core::domain::ActivityRecord;
use tenant_core::error::DomainError;
use tenant_core::repositories::ActivityRepository;

use super::db_error;
use crate::shard::ShardRouter;

pub struct PgActivityRepository {
    router: Arc<ShardRouter<PgPool>>,
}

impl PgActivityRepository {
    pub fn new(router: Arc<ShardRouter<PgPool>>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn record(&self, record: &ActivityRecord) -> Result<(), DomainError> {
        let (shard, pool) = self.router.client_for(&record.workspace_id);

        sqlx::query(
            r#"
            INSERT INTO activities (id, workspace_id, action, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(&record.workspace_id)
        .bind(record.action.as_str())
        .bind(&record.metadata)
        .bind(record.created_at)
        .execute(pool)
        .await
        .map_err(|e| db_error(shard, "recording activity", e))?;

        Ok(())
    }
}
