use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use tenant_core::domain::BillingLogEntry;
use tenant_core::error::DomainError;
use tenant_core::repositories::BillingLogRepository;

use super::db_error;
use crate::shard::ShardRouter;

/// Append-only; entries sit next to their workspace.
pub struct PgBillingLogRepository {
    router: Arc<ShardRouter<PgPool>>,
}

impl PgBillingLogRepository {
    pub fn new(router: Arc<ShardRouter<PgPool>>) -> Self {
        Self { router }
    }
}

#[derive(Debug, FromRow)]
struct BillingLogRow {
    pub id: Uuid,
    pub workspace_id: String,
    pub action: String,
    pub provider: String,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BillingLogRow> for BillingLogEntry {
    type Error = DomainError;

    fn try_from(row: BillingLogRow) -> Result<Self, Self::Error> {
        Ok(BillingLogEntry {
            id: row.id,
            workspace_id: row.workspace_id,
            action: row.action,
            provider: row.provider.parse()?,
            amount_cents: row.amount_cents,
            currency: row.currency,
            metadata: row.metadata,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl BillingLogRepository for PgBillingLogRepository {
    async fn append(&self, entry: &BillingLogEntry) -> Result<(), DomainError> {
        let (shard, pool) = self.router.client_for(&entry.workspace_id);

        sqlx::query(
            r#"
            INSERT INTO billing_logs (
                id, workspace_id, action, provider, amount_cents, currency, metadata, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.workspace_id)
        .bind(&entry.action)
        .bind(entry.provider.as_str())
        .bind(entry.amount_cents)
        .bind(&entry.currency)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(pool)
        .await
        .map_err(|e| db_error(shard, "appending billing log", e))?;

        Ok(())
    }

    async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<BillingLogEntry>, DomainError> {
        let (shard, pool) = self.router.client_for(workspace_id);

        let rows: Vec<BillingLogRow> = sqlx::query_as(
            r#"
            SELECT id, workspace_id, action, provider, amount_cents, currency, metadata, created_at
            FROM billing_logs
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error(shard, "listing billing logs", e))?;

        rows.into_iter().map(BillingLogEntry::try_from).collect()
    }
}
