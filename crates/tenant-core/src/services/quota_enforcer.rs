// ============================================================================
// Tenant Core - Quota Enforcer
// File: crates/tenant-core/src/services/quota_enforcer.rs
// ============================================================================
//! Allow/deny decisions for resource-creating operations

use std::sync::Arc;

use tenant_shared::constants::BYTES_PER_MB;
use tracing::{debug, info, warn};

use crate::domain::{Limit, PlanLimits, ResourceClass, Workspace};
use crate::error::DomainError;
use crate::repositories::WorkspaceRepository;
use crate::services::plan_catalog::PlanCatalog;
use crate::services::usage_aggregator::bytes_to_mb;

/// Pure guard evaluated before the caller's write. It never recomputes
/// counts: callers pass a freshly computed `current`.
pub struct QuotaEnforcer {
    workspaces: Arc<dyn WorkspaceRepository>,
}

impl QuotaEnforcer {
    pub fn new(workspaces: Arc<dyn WorkspaceRepository>) -> Self {
        Self { workspaces }
    }

    pub async fn assert_allowed(
        &self,
        workspace_id: &str,
        resource: ResourceClass,
        current: u64,
    ) -> Result<(), DomainError> {
        let workspace = self.load_workspace(workspace_id).await?;
        Self::evaluate(&workspace, resource, current)
    }

    /// Gate a single upload by its size against the plan's per-file cap.
    pub async fn assert_upload_size(&self, workspace_id: &str, size_bytes: u64) -> Result<(), DomainError> {
        let workspace = self.load_workspace(workspace_id).await?;
        Self::ensure_billing_active(&workspace)?;

        let limits = PlanCatalog::limits_for(workspace.plan);
        match limits.file_size_mb {
            Limit::Unlimited => Ok(()),
            Limit::Max(max_mb) if size_bytes <= max_mb.saturating_mul(BYTES_PER_MB) => Ok(()),
            Limit::Max(max_mb) => {
                info!(
                    workspace_id = %workspace.id,
                    size_bytes,
                    max_mb,
                    "Upload rejected: file too large for plan"
                );
                Err(DomainError::QuotaExceeded {
                    resource: ResourceClass::Storage,
                    message: format!(
                        "Files on the {} plan can be at most {} MB. Upgrade to upload larger files.",
                        workspace.plan.display_name(),
                        max_mb
                    ),
                })
            }
        }
    }

    /// Gate an upload against total storage: what is already stored plus
    /// the new file must fit within the plan's `storage_mb`.
    pub async fn assert_storage_available(
        &self,
        workspace_id: &str,
        stored_bytes: u64,
        size_bytes: u64,
    ) -> Result<(), DomainError> {
        let workspace = self.load_workspace(workspace_id).await?;
        Self::evaluate_storage(&workspace, stored_bytes, size_bytes)
    }

    pub fn evaluate_storage(workspace: &Workspace, stored_bytes: u64, size_bytes: u64) -> Result<(), DomainError> {
        Self::ensure_billing_active(workspace)?;

        let after_mb = bytes_to_mb(stored_bytes.saturating_add(size_bytes));
        match PlanCatalog::limits_for(workspace.plan).storage_mb {
            Limit::Unlimited => Ok(()),
            Limit::Max(max_mb) if after_mb <= max_mb => Ok(()),
            Limit::Max(max_mb) => {
                info!(
                    workspace_id = %workspace.id,
                    stored_bytes,
                    size_bytes,
                    max_mb,
                    "Upload rejected: storage would exceed plan"
                );
                Err(DomainError::QuotaExceeded {
                    resource: ResourceClass::Storage,
                    message: format!(
                        "This upload would bring storage to {} MB but the {} plan allows up to {} MB. Upgrade to get more storage.",
                        after_mb,
                        workspace.plan.display_name(),
                        max_mb
                    ),
                })
            }
        }
    }

    /// Decision against an already loaded workspace.
    pub fn evaluate(workspace: &Workspace, resource: ResourceClass, current: u64) -> Result<(), DomainError> {
        Self::ensure_billing_active(workspace)?;

        let limits = PlanCatalog::limits_for(workspace.plan);

        if resource.feature_flag(limits) == Some(false) {
            info!(
                workspace_id = %workspace.id,
                resource = %resource,
                plan = %workspace.plan,
                "Denied: feature not included in plan"
            );
            return Err(DomainError::QuotaExceeded {
                resource,
                message: feature_message(workspace, resource),
            });
        }

        let limit = resource.limit(limits);
        if limit.permits(current) {
            debug!(
                workspace_id = %workspace.id,
                resource = %resource,
                current,
                limit = %limit,
                "Quota check passed"
            );
            return Ok(());
        }

        info!(
            workspace_id = %workspace.id,
            resource = %resource,
            current,
            limit = %limit,
            "Denied: quota exhausted"
        );
        Err(DomainError::QuotaExceeded {
            resource,
            message: limit_message(workspace, limits, resource),
        })
    }

    fn ensure_billing_active(workspace: &Workspace) -> Result<(), DomainError> {
        if workspace.is_deactivated() {
            warn!(workspace_id = %workspace.id, "Denied: billing deactivated");
            return Err(DomainError::BillingDeactivated {
                workspace_id: workspace.id.clone(),
            });
        }
        Ok(())
    }

    async fn load_workspace(&self, workspace_id: &str) -> Result<Workspace, DomainError> {
        self.workspaces
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| DomainError::TenantNotFound(workspace_id.to_string()))
    }
}

fn limit_message(workspace: &Workspace, limits: &PlanLimits, resource: ResourceClass) -> String {
    let hint = match resource {
        ResourceClass::Storage => "Upgrade to get more storage.",
        ResourceClass::AiRequests | ResourceClass::ApiRequests => "Upgrade for a higher monthly quota.",
        _ => "Upgrade to create more.",
    };
    format!(
        "Your {} plan allows up to {} {}. {}",
        workspace.plan.display_name(),
        resource.limit(limits),
        resource.noun(),
        hint
    )
}

fn feature_message(workspace: &Workspace, resource: ResourceClass) -> String {
    format!(
        "The {} plan does not include {}. Upgrade to unlock it.",
        workspace.plan.display_name(),
        resource.feature_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingStatus, Plan};
    use crate::repositories::MockWorkspaceRepository;

    fn workspace(plan: Plan) -> Workspace {
        let mut ws = Workspace::new("Acme".to_string()).unwrap();
        ws.plan = plan;
        ws
    }

    fn enforcer_for(ws: Option<Workspace>) -> QuotaEnforcer {
        let mut repo = MockWorkspaceRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(ws.clone()));
        QuotaEnforcer::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn free_plan_project_cap_message() {
        let ws = workspace(Plan::Free);
        let id = ws.id.clone();
        let enforcer = enforcer_for(Some(ws));

        let err = enforcer
            .assert_allowed(&id, ResourceClass::Projects, 3)
            .await
            .unwrap_err();

        match err {
            DomainError::QuotaExceeded { resource, message } => {
                assert_eq!(resource, ResourceClass::Projects);
                assert!(message.contains("3 projects"), "{}", message);
                assert!(message.contains("Upgrade"), "{}", message);
            }
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
    }

    #[test]
    fn boundary_at_cap() {
        let ws = workspace(Plan::Growth);
        let capped = [
            (ResourceClass::Projects, 15),
            (ResourceClass::Tasks, 1_000),
            (ResourceClass::Teams, 5),
            (ResourceClass::Members, 15),
            (ResourceClass::Boards, 20),
            (ResourceClass::CalendarEvents, 500),
            (ResourceClass::Storage, 5_120),
            (ResourceClass::AiRequests, 100),
            (ResourceClass::Automations, 10),
            (ResourceClass::Integrations, 3),
            (ResourceClass::ChatMessages, 10_000),
        ];
        for (resource, max) in capped {
            assert!(QuotaEnforcer::evaluate(&ws, resource, max - 1).is_ok(), "{} at max-1", resource);
            assert!(QuotaEnforcer::evaluate(&ws, resource, max).is_err(), "{} at max", resource);
        }
    }

    #[test]
    fn unlimited_always_permits() {
        let ws = workspace(Plan::Plus);
        for current in [0, 1, 10_000, u64::MAX] {
            assert!(QuotaEnforcer::evaluate(&ws, ResourceClass::Projects, current).is_ok());
            assert!(QuotaEnforcer::evaluate(&ws, ResourceClass::Automations, current).is_ok());
        }
    }

    #[test]
    fn disabled_feature_denies_even_at_zero() {
        let ws = workspace(Plan::Free);
        for resource in [
            ResourceClass::AiRequests,
            ResourceClass::Automations,
            ResourceClass::Integrations,
            ResourceClass::ApiRequests,
            ResourceClass::Analytics,
        ] {
            let err = QuotaEnforcer::evaluate(&ws, resource, 0).unwrap_err();
            assert!(matches!(err, DomainError::QuotaExceeded { .. }), "{}", resource);
        }
    }

    #[test]
    fn flag_and_cap_must_both_hold() {
        // Growth has analytics but no API access.
        let ws = workspace(Plan::Growth);
        assert!(QuotaEnforcer::evaluate(&ws, ResourceClass::Analytics, 0).is_ok());
        assert!(QuotaEnforcer::evaluate(&ws, ResourceClass::ApiRequests, 0).is_err());

        let pro = workspace(Plan::Pro);
        assert!(QuotaEnforcer::evaluate(&pro, ResourceClass::ApiRequests, 9_999).is_ok());
        assert!(QuotaEnforcer::evaluate(&pro, ResourceClass::ApiRequests, 10_000).is_err());
    }

    #[test]
    fn deactivation_denies_every_class() {
        let mut ws = workspace(Plan::Plus);
        ws.billing_status = BillingStatus::Deactivated;
        for resource in ResourceClass::ALL {
            let err = QuotaEnforcer::evaluate(&ws, resource, 0).unwrap_err();
            assert!(
                matches!(err, DomainError::BillingDeactivated { .. }),
                "{} should be blocked by billing",
                resource
            );
        }
    }

    #[test]
    fn past_due_and_canceled_still_follow_quota() {
        let mut ws = workspace(Plan::Free);
        ws.billing_status = BillingStatus::PastDue;
        assert!(QuotaEnforcer::evaluate(&ws, ResourceClass::Projects, 2).is_ok());
        ws.billing_status = BillingStatus::Canceled;
        assert!(QuotaEnforcer::evaluate(&ws, ResourceClass::Projects, 2).is_ok());
    }

    #[tokio::test]
    async fn missing_workspace_is_tenant_not_found() {
        let enforcer = enforcer_for(None);
        let err = enforcer
            .assert_allowed("ghost", ResourceClass::Tasks, 0)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::TenantNotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn upload_size_respects_per_file_cap() {
        let ws = workspace(Plan::Free);
        let id = ws.id.clone();
        let enforcer = enforcer_for(Some(ws));

        assert!(enforcer.assert_upload_size(&id, 5 * BYTES_PER_MB).await.is_ok());
        let err = enforcer
            .assert_upload_size(&id, 5 * BYTES_PER_MB + 1)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("5 MB"));
    }

    #[test]
    fn storage_counts_the_incoming_file() {
        let ws = workspace(Plan::Free);
        let mb = BYTES_PER_MB;

        assert!(QuotaEnforcer::evaluate_storage(&ws, 95 * mb, 5 * mb).is_ok());
        let err = QuotaEnforcer::evaluate_storage(&ws, 99 * mb, 5 * mb).unwrap_err();
        match err {
            DomainError::QuotaExceeded { resource, message } => {
                assert_eq!(resource, ResourceClass::Storage);
                assert!(message.contains("104 MB"), "{}", message);
            }
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
    }

    #[test]
    fn storage_check_respects_unlimited_and_deactivation() {
        let mut ws = workspace(Plan::Plus);
        assert!(QuotaEnforcer::evaluate_storage(&ws, 0, 500 * BYTES_PER_MB).is_ok());

        ws.billing_status = BillingStatus::Deactivated;
        assert!(matches!(
            QuotaEnforcer::evaluate_storage(&ws, 0, 1),
            Err(DomainError::BillingDeactivated { .. })
        ));
    }
}
