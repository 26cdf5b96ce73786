//! Usage snapshot types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenant_shared::constants::{CRITICAL_THRESHOLD_PERCENT, WARNING_THRESHOLD_PERCENT};

use crate::domain::plan::{Limit, Plan, PlanLimits};
use crate::domain::resource::ResourceClass;
use crate::domain::workspace::BillingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Ok,
    Warning,
    Critical,
}

impl WarningLevel {
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage >= CRITICAL_THRESHOLD_PERCENT {
            WarningLevel::Critical
        } else if percentage >= WARNING_THRESHOLD_PERCENT {
            WarningLevel::Warning
        } else {
            WarningLevel::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceUsage {
    pub resource: ResourceClass,
    pub current: u64,
    pub max: Limit,
    pub percentage: u8,
    pub warning: WarningLevel,
}

impl ResourceUsage {
    /// Derive percentage and warning level. A deactivated workspace reads as
    /// fully consumed everywhere.
    pub fn compute(resource: ResourceClass, current: u64, max: Limit, deactivated: bool) -> Self {
        let percentage = if deactivated {
            CRITICAL_THRESHOLD_PERCENT
        } else {
            percentage_of(current, max)
        };

        Self {
            resource,
            current,
            max,
            percentage,
            warning: WarningLevel::from_percentage(percentage),
        }
    }
}

/// `round(current / max * 100)` clamped to 100. Unlimited reads as 0; a zero
/// cap reads as fully consumed.
fn percentage_of(current: u64, max: Limit) -> u8 {
    match max {
        Limit::Unlimited => 0,
        Limit::Max(0) => CRITICAL_THRESHOLD_PERCENT,
        Limit::Max(max) => {
            let pct = (current as f64 / max as f64 * 100.0).round();
            pct.min(CRITICAL_THRESHOLD_PERCENT as f64) as u8
        }
    }
}

/// Boolean feature families of the workspace's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureFlags {
    pub ai: bool,
    pub automation: bool,
    pub integrations: bool,
    pub api_access: bool,
    pub analytics: bool,
}

impl From<&PlanLimits> for FeatureFlags {
    fn from(limits: &PlanLimits) -> Self {
        Self {
            ai: limits.has_ai,
            automation: limits.has_automation,
            integrations: limits.has_integrations,
            api_access: limits.has_api_access,
            analytics: limits.has_analytics,
        }
    }
}

/// Point-in-time view of current-vs-max for every metered resource.
/// Computed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub workspace_id: String,
    pub plan: Plan,
    pub billing_status: BillingStatus,
    pub resources: Vec<ResourceUsage>,
    pub features: FeatureFlags,
    pub computed_at: DateTime<Utc>,
}

impl UsageSnapshot {
    pub fn get(&self, resource: ResourceClass) -> Option<&ResourceUsage> {
        self.resources.iter().find(|usage| usage.resource == resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_is_always_ok() {
        let usage = ResourceUsage::compute(ResourceClass::Tasks, 1_000_000, Limit::Unlimited, false);
        assert_eq!(usage.percentage, 0);
        assert_eq!(usage.warning, WarningLevel::Ok);
    }

    #[test]
    fn warning_thresholds() {
        let at = |current| ResourceUsage::compute(ResourceClass::Projects, current, Limit::Max(10), false);
        assert_eq!(at(7).warning, WarningLevel::Ok);
        assert_eq!(at(8).warning, WarningLevel::Warning);
        assert_eq!(at(8).percentage, 80);
        assert_eq!(at(10).warning, WarningLevel::Critical);
        assert_eq!(at(25).percentage, 100);
    }

    #[test]
    fn rounds_to_nearest_percent() {
        let usage = ResourceUsage::compute(ResourceClass::Projects, 1, Limit::Max(3), false);
        assert_eq!(usage.percentage, 33);
        let usage = ResourceUsage::compute(ResourceClass::Projects, 2, Limit::Max(3), false);
        assert_eq!(usage.percentage, 67);
    }

    #[test]
    fn zero_cap_reads_as_critical() {
        let usage = ResourceUsage::compute(ResourceClass::AiRequests, 0, Limit::Max(0), false);
        assert_eq!(usage.percentage, 100);
        assert_eq!(usage.warning, WarningLevel::Critical);
    }

    #[test]
    fn deactivation_overrides_everything() {
        let usage = ResourceUsage::compute(ResourceClass::Tasks, 0, Limit::Unlimited, true);
        assert_eq!(usage.percentage, 100);
        assert_eq!(usage.warning, WarningLevel::Critical);
    }
}
