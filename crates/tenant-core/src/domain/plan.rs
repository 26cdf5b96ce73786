// ============================================================================
// Tenant Core - Plan Entity
// File: crates/tenant-core/src/domain/plan.rs
// Description: Plan tiers and their resource ceilings
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tenant_shared::constants::UNLIMITED;

use crate::error::DomainError;

/// Plan tier enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Growth,
    Pro,
    Plus,
    Lifetime,
}

impl Plan {
    pub const ALL: [Plan; 5] = [Plan::Free, Plan::Growth, Plan::Pro, Plan::Plus, Plan::Lifetime];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Growth => "growth",
            Plan::Pro => "pro",
            Plan::Plus => "plus",
            Plan::Lifetime => "lifetime",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Growth => "Growth",
            Plan::Pro => "Pro",
            Plan::Plus => "Plus",
            Plan::Lifetime => "Lifetime",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "growth" => Ok(Plan::Growth),
            "pro" => Ok(Plan::Pro),
            "plus" => Ok(Plan::Plus),
            "lifetime" => Ok(Plan::Lifetime),
            other => Err(DomainError::InvalidPlan(other.to_string())),
        }
    }
}

/// A numeric ceiling. Persisted and serialized as an integer where `-1`
/// means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Limit {
    Unlimited,
    Max(u64),
}

impl Limit {
    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// `true` when one more unit may be added on top of `current`.
    pub const fn permits(&self, current: u64) -> bool {
        match self {
            Limit::Unlimited => true,
            Limit::Max(max) => current < *max,
        }
    }

    pub const fn as_raw(&self) -> i64 {
        match self {
            Limit::Unlimited => UNLIMITED,
            Limit::Max(max) => *max as i64,
        }
    }
}

impl From<i64> for Limit {
    /// Any negative value is read as the unlimited sentinel.
    fn from(raw: i64) -> Self {
        if raw < 0 {
            Limit::Unlimited
        } else {
            Limit::Max(raw as u64)
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        limit.as_raw()
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unlimited => f.write_str("unlimited"),
            Limit::Max(max) => write!(f, "{}", max),
        }
    }
}

/// Resource limits for a plan tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub plan: Plan,

    pub max_projects: Limit,
    pub max_tasks: Limit,
    pub max_teams: Limit,
    pub max_members: Limit,
    pub max_boards: Limit,
    pub max_calendar_events: Limit,

    pub storage_mb: Limit,
    pub file_size_mb: Limit,

    pub has_ai: bool,
    pub ai_requests_per_month: Limit,

    pub has_automation: bool,
    pub max_automations: Limit,

    pub has_integrations: bool,
    pub max_integrations: Limit,

    pub has_api_access: bool,
    pub api_requests_per_month: Limit,

    pub has_analytics: bool,

    pub max_chat_messages: Limit,
    pub retention_days: Limit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_is_free() {
        assert_eq!(Plan::default(), Plan::Free);
    }

    #[test]
    fn parses_known_plans_case_insensitively() {
        assert_eq!("Growth".parse::<Plan>().unwrap(), Plan::Growth);
        assert_eq!(" lifetime ".parse::<Plan>().unwrap(), Plan::Lifetime);
        for plan in Plan::ALL {
            assert_eq!(plan.as_str().parse::<Plan>().unwrap(), plan);
        }
    }

    #[test]
    fn unknown_plan_fails_loud() {
        let err = "enterprise".parse::<Plan>().unwrap_err();
        assert_eq!(err, DomainError::InvalidPlan("enterprise".to_string()));
    }

    #[test]
    fn negative_raw_limit_is_unlimited() {
        assert_eq!(Limit::from(-1), Limit::Unlimited);
        assert_eq!(Limit::from(0), Limit::Max(0));
        assert_eq!(Limit::Unlimited.as_raw(), -1);
        assert_eq!(serde_json::to_string(&Limit::Unlimited).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<Limit>("25").unwrap(), Limit::Max(25));
    }

    #[test]
    fn permits_strictly_below_cap() {
        assert!(Limit::Max(3).permits(2));
        assert!(!Limit::Max(3).permits(3));
        assert!(!Limit::Max(0).permits(0));
        assert!(Limit::Unlimited.permits(u64::MAX));
    }
}
