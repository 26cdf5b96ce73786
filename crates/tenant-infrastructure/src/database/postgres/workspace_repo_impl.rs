// ============================================================================
// Tenant Infrastructure - PostgreSQL Workspace Repository
// File: crates/tenant-infrastructure/src/database/postgres/workspace_repo_impl.rs
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};

use tenant_core::domain::Workspace;
use tenant_core::error::DomainError;
use tenant_core::repositories::WorkspaceRepository;

use super::db_error;
use crate::shard::ShardRouter;

const WORKSPACE_COLUMNS: &str = r#"
    id, name, plan, billing_provider, billing_status, billing_interval,
    subscription_id, customer_id, order_id, next_billing_date, currency,
    is_lifetime, billing_email, created_at, updated_at
"#;

/// Workspace rows live on the shard their id routes to.
pub struct PgWorkspaceRepository {
    router: Arc<ShardRouter<PgPool>>,
}

impl PgWorkspaceRepository {
    pub fn new(router: Arc<ShardRouter<PgPool>>) -> Self {
        Self { router }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct WorkspaceRow {
    pub id: String,
    pub name: String,
    pub plan: String,
    pub billing_provider: String,
    pub billing_status: String,
    pub billing_interval: String,
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
    pub order_id: Option<String>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub currency: Option<String>,
    pub is_lifetime: bool,
    pub billing_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fails on unknown enum strings instead of defaulting.
impl TryFrom<WorkspaceRow> for Workspace {
    type Error = DomainError;

    fn try_from(row: WorkspaceRow) -> Result<Self, Self::Error> {
        Ok(Workspace {
            plan: row.plan.parse()?,
            billing_provider: row.billing_provider.parse()?,
            billing_status: row.billing_status.parse()?,
            billing_interval: row.billing_interval.parse()?,
            id: row.id,
            name: row.name,
            subscription_id: row.subscription_id,
            customer_id: row.customer_id,
            order_id: row.order_id,
            next_billing_date: row.next_billing_date,
            currency: row.currency,
            is_lifetime: row.is_lifetime,
            billing_email: row.billing_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn fetch_by_subscription(pool: PgPool, subscription_id: String) -> Result<Option<WorkspaceRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {} FROM workspaces WHERE subscription_id = $1",
        WORKSPACE_COLUMNS
    ))
    .bind(subscription_id)
    .fetch_optional(&pool)
    .await
}

#[async_trait]
impl WorkspaceRepository for PgWorkspaceRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>, DomainError> {
        let (shard, pool) = self.router.client_for(id);

        let row: Option<WorkspaceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM workspaces WHERE id = $1",
            WORKSPACE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error(shard, "finding workspace by id", e))?;

        row.map(Workspace::try_from).transpose()
    }

    async fn find_by_subscription_id(&self, subscription_id: &str) -> Result<Option<Workspace>, DomainError> {
        let hit = self
            .router
            .scatter_find("workspace by subscription", |_, pool| {
                fetch_by_subscription(pool, subscription_id.to_string())
            })
            .await;

        match hit {
            Some((row, shard)) => {
                info!(shard, subscription_id, "Resolved workspace by subscription");
                Workspace::try_from(row).map(Some)
            }
            None => {
                warn!(subscription_id, "No workspace holds subscription on any reachable shard");
                Ok(None)
            }
        }
    }

    async fn create(&self, workspace: &Workspace) -> Result<Workspace, DomainError> {
        let (shard, pool) = self.router.client_for(&workspace.id);
        info!(shard, workspace_id = %workspace.id, "Creating workspace: {}", workspace.name);

        let row: WorkspaceRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO workspaces (
                id, name, plan, billing_provider, billing_status, billing_interval,
                subscription_id, customer_id, order_id, next_billing_date, currency,
                is_lifetime, billing_email, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            WORKSPACE_COLUMNS
        ))
        .bind(&workspace.id)
        .bind(&workspace.name)
        .bind(workspace.plan.as_str())
        .bind(workspace.billing_provider.as_str())
        .bind(workspace.billing_status.as_str())
        .bind(workspace.billing_interval.as_str())
        .bind(&workspace.subscription_id)
        .bind(&workspace.customer_id)
        .bind(&workspace.order_id)
        .bind(workspace.next_billing_date)
        .bind(&workspace.currency)
        .bind(workspace.is_lifetime)
        .bind(&workspace.billing_email)
        .bind(workspace.created_at)
        .bind(workspace.updated_at)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error(shard, "creating workspace", e))?;

        Workspace::try_from(row)
    }

    async fn update(&self, workspace: &Workspace) -> Result<Workspace, DomainError> {
        let (shard, pool) = self.router.client_for(&workspace.id);

        let row: Option<WorkspaceRow> = sqlx::query_as(&format!(
            r#"
            UPDATE workspaces SET
                name = $2, plan = $3, billing_provider = $4, billing_status = $5,
                billing_interval = $6, subscription_id = $7, customer_id = $8,
                order_id = $9, next_billing_date = $10, currency = $11,
                is_lifetime = $12, billing_email = $13, updated_at = $14
            WHERE id = $1
            RETURNING {}
            "#,
            WORKSPACE_COLUMNS
        ))
        .bind(&workspace.id)
        .bind(&workspace.name)
        .bind(workspace.plan.as_str())
        .bind(workspace.billing_provider.as_str())
        .bind(workspace.billing_status.as_str())
        .bind(workspace.billing_interval.as_str())
        .bind(&workspace.subscription_id)
        .bind(&workspace.customer_id)
        .bind(&workspace.order_id)
        .bind(workspace.next_billing_date)
        .bind(&workspace.currency)
        .bind(workspace.is_lifetime)
        .bind(&workspace.billing_email)
        .bind(workspace.updated_at)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error(shard, "updating workspace", e))?;

        match row {
            Some(row) => Workspace::try_from(row),
            None => Err(DomainError::TenantNotFound(workspace.id.clone())),
        }
    }
}
