//! Governance services

pub mod plan_catalog;
pub mod usage_aggregator;
pub mod quota_enforcer;
pub mod quota_guard;
pub mod notifier;
pub mod billing;
pub mod workspace_service;
pub mod activity_recorder;

pub use plan_catalog::{PlanCatalog, ProductCatalog};
pub use usage_aggregator::UsageAggregator;
pub use quota_enforcer::QuotaEnforcer;
pub use quota_guard::QuotaGuard;
pub use notifier::{BillingNotifier, Publisher, PublishingNotifier};
pub use billing::{BatchReport, BillingStateMachine, EventOutcome, FailedEvent, WebhookEnvelope, WebhookEvent};
pub use workspace_service::WorkspaceService;
pub use activity_recorder::ActivityRecorder;
