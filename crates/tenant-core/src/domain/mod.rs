//! # Tenant Core - Domain Module
//! 
//! Domain entities for workspace governance.

pub mod plan;
pub mod resource;
pub mod workspace;
pub mod usage;
pub mod billing_log;
pub mod activity;

// Re-export all entities and enums
pub use plan::{Limit, Plan, PlanLimits};
pub use resource::ResourceClass;
pub use workspace::{BillingInterval, BillingProvider, BillingStatus, Workspace};
pub use usage::{FeatureFlags, ResourceUsage, UsageSnapshot, WarningLevel};
pub use billing_log::{BillingAction, BillingLogEntry};
pub use activity::{ActivityAction, ActivityRecord, UploadResult};
