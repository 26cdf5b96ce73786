use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use tenant_core::repositories::{
    ActivityRepository, BillingLogRepository, UsageRepository, WorkspaceRepository,
};
use tenant_core::services::{
    ActivityRecorder, BillingStateMachine, ProductCatalog, PublishingNotifier, QuotaEnforcer, QuotaGuard,
    UsageAggregator, WorkspaceService,
};
use tenant_infrastructure::shard::{ShardRouter, ShardStatus};
use tenant_shared::config::AppConfig;

use crate::events::EventBus;
use crate::security::WebhookVerifier;

/// Shard reachability as reported by the readiness endpoint.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn probe(&self) -> Vec<ShardStatus>;
}

#[async_trait]
impl ReadinessProbe for ShardRouter<PgPool> {
    async fn probe(&self) -> Vec<ShardStatus> {
        self.probe_all().await
    }
}

/// Repository adapters the services are wired from.
pub struct Repositories {
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub billing_logs: Arc<dyn BillingLogRepository>,
    pub usage: Arc<dyn UsageRepository>,
    pub activities: Arc<dyn ActivityRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub workspaces: Arc<WorkspaceService>,
    pub usage: Arc<UsageAggregator>,
    pub quota: Arc<QuotaGuard>,
    pub activities: Arc<ActivityRecorder>,
    pub billing: Arc<BillingStateMachine>,
    pub verifier: Arc<WebhookVerifier>,
    pub events: Arc<EventBus>,
    pub readiness: Arc<dyn ReadinessProbe>,
}

impl AppState {
    pub fn new(config: &AppConfig, repos: Repositories, readiness: Arc<dyn ReadinessProbe>) -> Self {
        let events = Arc::new(EventBus::new(config.event_bus.capacity));
        let usage = Arc::new(UsageAggregator::new(repos.workspaces.clone(), repos.usage.clone()));
        let enforcer = Arc::new(QuotaEnforcer::new(repos.workspaces.clone()));
        let quota = Arc::new(QuotaGuard::new(usage.clone(), enforcer));
        let billing = Arc::new(BillingStateMachine::new(
            repos.workspaces.clone(),
            repos.billing_logs.clone(),
            Arc::new(PublishingNotifier::new(events.clone())),
            ProductCatalog::from_config(&config.billing.product_plans),
        ));

        Self {
            workspaces: Arc::new(WorkspaceService::new(repos.workspaces, repos.billing_logs)),
            usage,
            quota,
            activities: Arc::new(ActivityRecorder::new(repos.activities)),
            billing,
            verifier: Arc::new(WebhookVerifier::from_settings(&config.billing)),
            events,
            readiness,
        }
    }
}
