//! Repository traits (ports)

pub mod workspace_repository;
pub mod billing_log_repository;
pub mod usage_repository;
pub mod activity_repository;

pub use workspace_repository::WorkspaceRepository;
pub use billing_log_repository::BillingLogRepository;
pub use usage_repository::UsageRepository;
pub use activity_repository::ActivityRepository;

#[cfg(test)]
pub use workspace_repository::MockWorkspaceRepository;
#[cfg(test)]
pub use billing_log_repository::MockBillingLogRepository;
#[cfg(test)]
pub use usage_repository::MockUsageRepository;
