// ============================================================================
// Tenant Core - Workspace Service
// File: crates/tenant-core/src/services/workspace_service.rs
// ============================================================================
//! Workspace signup, explicit plan changes and billing history

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};

use crate::domain::{BillingAction, BillingLogEntry, BillingProvider, Plan, Workspace};
use crate::error::DomainError;
use crate::repositories::{BillingLogRepository, WorkspaceRepository};

pub struct WorkspaceService {
    workspaces: Arc<dyn WorkspaceRepository>,
    billing_logs: Arc<dyn BillingLogRepository>,
}

impl WorkspaceService {
    pub fn new(workspaces: Arc<dyn WorkspaceRepository>, billing_logs: Arc<dyn BillingLogRepository>) -> Self {
        Self { workspaces, billing_logs }
    }

    /// Signup: new workspaces start on the free plan.
    pub async fn create_workspace(&self, name: &str) -> Result<Workspace, DomainError> {
        let workspace = Workspace::new(name.to_string())
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let created = self.workspaces.create(&workspace).await?;
        info!(workspace_id = %created.id, "Workspace created");
        Ok(created)
    }

    pub async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, DomainError> {
        self.workspaces
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| DomainError::TenantNotFound(workspace_id.to_string()))
    }

    /// Explicit plan change outside the webhook flow. The tenant write
    /// happens first, then its audit entry.
    pub async fn change_plan(&self, workspace_id: &str, plan: Plan) -> Result<Workspace, DomainError> {
        let mut workspace = self.get_workspace(workspace_id).await?;
        let previous = workspace.plan;
        workspace.change_plan(plan);

        let updated = self.workspaces.update(&workspace).await?;

        let entry = BillingLogEntry::new(
            &updated.id,
            BillingAction::PlanChangedManually,
            BillingProvider::None,
            json!({ "from": previous, "to": plan }),
        );
        if let Err(e) = self.billing_logs.append(&entry).await {
            error!(workspace_id = %updated.id, "Billing log write failed after plan change: {}", e);
            return Err(DomainError::BillingLogWriteFailed {
                workspace_id: updated.id,
                reason: e.to_string(),
            });
        }

        info!(workspace_id = %updated.id, from = %previous, to = %plan, "Plan changed");
        Ok(updated)
    }

    pub async fn billing_history(&self, workspace_id: &str) -> Result<Vec<BillingLogEntry>, DomainError> {
        self.get_workspace(workspace_id).await?;
        self.billing_logs.list_for_workspace(workspace_id).await
    }
}
