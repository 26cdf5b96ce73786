// ============================================================================
// Tenant Core - Usage Aggregator
// File: crates/tenant-core/src/services/usage_aggregator.rs
// ============================================================================
//! Computes live usage for a workspace against its plan

use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use tenant_shared::constants::BYTES_PER_MB;
use tracing::{debug, warn};

use crate::domain::{
    ActivityAction, FeatureFlags, ResourceClass, ResourceUsage, UsageSnapshot, Workspace,
};
use crate::error::DomainError;
use crate::repositories::{UsageRepository, WorkspaceRepository};
use crate::services::plan_catalog::PlanCatalog;

pub struct UsageAggregator {
    workspaces: Arc<dyn WorkspaceRepository>,
    usage: Arc<dyn UsageRepository>,
}

impl UsageAggregator {
    pub fn new(workspaces: Arc<dyn WorkspaceRepository>, usage: Arc<dyn UsageRepository>) -> Self {
        Self { workspaces, usage }
    }

    /// Build a fresh snapshot. Any failing sub-count fails the whole call.
    pub async fn usage_for(&self, workspace_id: &str) -> Result<UsageSnapshot, DomainError> {
        let workspace = self.load_workspace(workspace_id).await?;
        let limits = PlanCatalog::limits_for(workspace.plan);
        let deactivated = workspace.is_deactivated();
        let now = Utc::now();

        let mut resources = Vec::with_capacity(ResourceClass::METERED.len());
        for resource in ResourceClass::METERED {
            let current = self.count_at(&workspace.id, resource, now).await?;
            resources.push(ResourceUsage::compute(
                resource,
                current,
                resource.limit(limits),
                deactivated,
            ));
        }

        debug!(
            workspace_id = %workspace.id,
            plan = %workspace.plan,
            deactivated,
            "Usage snapshot computed"
        );

        Ok(UsageSnapshot {
            workspace_id: workspace.id,
            plan: workspace.plan,
            billing_status: workspace.billing_status,
            resources,
            features: FeatureFlags::from(limits),
            computed_at: now,
        })
    }

    /// Fresh count of a single resource, as fed to the quota enforcer.
    pub async fn current_count(&self, workspace_id: &str, resource: ResourceClass) -> Result<u64, DomainError> {
        self.count_at(workspace_id, resource, Utc::now()).await
    }

    /// Total bytes of recorded uploads.
    pub async fn stored_bytes(&self, workspace_id: &str) -> Result<u64, DomainError> {
        self.usage
            .sum_activity_bytes(workspace_id, ActivityAction::FileUpload)
            .await
    }

    async fn count_at(
        &self,
        workspace_id: &str,
        resource: ResourceClass,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        match resource {
            ResourceClass::Storage => Ok(bytes_to_mb(self.stored_bytes(workspace_id).await?)),
            ResourceClass::AiRequests => {
                self.usage
                    .count_activity_since(workspace_id, ActivityAction::AiGeneration, month_start(now))
                    .await
            }
            ResourceClass::ApiRequests => {
                self.usage
                    .count_activity_since(workspace_id, ActivityAction::ApiRequest, month_start(now))
                    .await
            }
            // Flag-only feature, nothing to count.
            ResourceClass::Analytics => Ok(0),
            ResourceClass::Projects
            | ResourceClass::Tasks
            | ResourceClass::Teams
            | ResourceClass::Members
            | ResourceClass::Boards
            | ResourceClass::CalendarEvents
            | ResourceClass::Automations
            | ResourceClass::Integrations
            | ResourceClass::ChatMessages => self.usage.count_resource(workspace_id, resource).await,
        }
    }

    async fn load_workspace(&self, workspace_id: &str) -> Result<Workspace, DomainError> {
        self.workspaces
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| {
                warn!("Usage requested for unknown workspace: {}", workspace_id);
                DomainError::TenantNotFound(workspace_id.to_string())
            })
    }
}

/// Whole megabytes, rounded up so any upload shows as used.
pub fn bytes_to_mb(bytes: u64) -> u64 {
    bytes.div_ceil(BYTES_PER_MB)
}

/// Midnight UTC on the first day of `now`'s calendar month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingStatus, Limit, Plan, WarningLevel};
    use crate::repositories::{MockUsageRepository, MockWorkspaceRepository};
    use mockall::predicate::eq;

    fn workspace(plan: Plan, status: BillingStatus) -> Workspace {
        let mut ws = Workspace::new("Acme".to_string()).unwrap();
        ws.id = "ws-1".to_string();
        ws.plan = plan;
        ws.billing_status = status;
        ws
    }

    fn workspaces_returning(ws: Option<Workspace>) -> MockWorkspaceRepository {
        let mut repo = MockWorkspaceRepository::new();
        repo.expect_find_by_id()
            .with(eq("ws-1"))
            .returning(move |_| Ok(ws.clone()));
        repo
    }

    fn usage_with(projects: u64, upload_bytes: u64, ai_requests: u64) -> MockUsageRepository {
        let mut usage = MockUsageRepository::new();
        usage.expect_count_resource().returning(move |_, resource| {
            Ok(match resource {
                ResourceClass::Projects => projects,
                ResourceClass::Tasks => 40,
                _ => 1,
            })
        });
        usage
            .expect_sum_activity_bytes()
            .with(eq("ws-1"), eq(ActivityAction::FileUpload))
            .returning(move |_, _| Ok(upload_bytes));
        usage
            .expect_count_activity_since()
            .withf(|_, action, since| {
                *action == ActivityAction::AiGeneration && *since == month_start(Utc::now())
            })
            .returning(move |_, _, _| Ok(ai_requests));
        usage
    }

    #[tokio::test]
    async fn snapshot_combines_counts_with_plan_limits() {
        let aggregator = UsageAggregator::new(
            Arc::new(workspaces_returning(Some(workspace(Plan::Free, BillingStatus::Active)))),
            Arc::new(usage_with(3, 5 * BYTES_PER_MB + 1, 0)),
        );

        let snapshot = aggregator.usage_for("ws-1").await.unwrap();

        let projects = snapshot.get(ResourceClass::Projects).unwrap();
        assert_eq!(projects.current, 3);
        assert_eq!(projects.max, Limit::Max(3));
        assert_eq!(projects.percentage, 100);
        assert_eq!(projects.warning, WarningLevel::Critical);

        let storage = snapshot.get(ResourceClass::Storage).unwrap();
        assert_eq!(storage.current, 6);
        assert_eq!(storage.percentage, 6);

        let tasks = snapshot.get(ResourceClass::Tasks).unwrap();
        assert_eq!(tasks.percentage, 40);
        assert_eq!(tasks.warning, WarningLevel::Ok);

        assert_eq!(snapshot.resources.len(), ResourceClass::METERED.len());
        assert!(!snapshot.features.ai);
    }

    #[tokio::test]
    async fn unlimited_resources_report_zero_percent() {
        let aggregator = UsageAggregator::new(
            Arc::new(workspaces_returning(Some(workspace(Plan::Plus, BillingStatus::Active)))),
            Arc::new(usage_with(10_000, 0, 0)),
        );

        let snapshot = aggregator.usage_for("ws-1").await.unwrap();
        let projects = snapshot.get(ResourceClass::Projects).unwrap();
        assert_eq!(projects.max, Limit::Unlimited);
        assert_eq!(projects.percentage, 0);
        assert_eq!(projects.warning, WarningLevel::Ok);
    }

    #[tokio::test]
    async fn deactivated_workspace_is_critical_everywhere() {
        let aggregator = UsageAggregator::new(
            Arc::new(workspaces_returning(Some(workspace(Plan::Plus, BillingStatus::Deactivated)))),
            Arc::new(usage_with(0, 0, 0)),
        );

        let snapshot = aggregator.usage_for("ws-1").await.unwrap();
        assert!(snapshot
            .resources
            .iter()
            .all(|usage| usage.percentage == 100 && usage.warning == WarningLevel::Critical));
    }

    #[tokio::test]
    async fn past_due_is_not_treated_as_deactivated() {
        let aggregator = UsageAggregator::new(
            Arc::new(workspaces_returning(Some(workspace(Plan::Growth, BillingStatus::PastDue)))),
            Arc::new(usage_with(1, 0, 0)),
        );

        let snapshot = aggregator.usage_for("ws-1").await.unwrap();
        let projects = snapshot.get(ResourceClass::Projects).unwrap();
        assert_eq!(projects.percentage, 7);
        assert_eq!(projects.warning, WarningLevel::Ok);
    }

    #[tokio::test]
    async fn unknown_workspace_is_a_hard_error() {
        let aggregator = UsageAggregator::new(
            Arc::new(workspaces_returning(None)),
            Arc::new(MockUsageRepository::new()),
        );

        let err = aggregator.usage_for("ws-1").await.unwrap_err();
        assert_eq!(err, DomainError::TenantNotFound("ws-1".to_string()));
    }

    #[tokio::test]
    async fn failing_sub_count_fails_the_snapshot() {
        let mut usage = MockUsageRepository::new();
        usage.expect_count_resource().returning(|_, _| {
            Err(DomainError::ShardUnavailable {
                shard: 2,
                reason: "connection refused".to_string(),
            })
        });
        let aggregator = UsageAggregator::new(
            Arc::new(workspaces_returning(Some(workspace(Plan::Free, BillingStatus::Active)))),
            Arc::new(usage),
        );

        let err = aggregator.usage_for("ws-1").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn month_start_is_first_day_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 42, 7).unwrap();
        assert_eq!(month_start(now), Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn bytes_round_up_to_whole_megabytes() {
        assert_eq!(bytes_to_mb(0), 0);
        assert_eq!(bytes_to_mb(1), 1);
        assert_eq!(bytes_to_mb(BYTES_PER_MB), 1);
        assert_eq!(bytes_to_mb(BYTES_PER_MB + 1), 2);
    }
}
