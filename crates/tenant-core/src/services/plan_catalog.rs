// ============================================================================
// Tenant Core - Plan Catalog
// File: crates/tenant-core/src/services/plan_catalog.rs
// ============================================================================
//! Compiled plan table and product-to-plan mapping

use std::collections::HashMap;

use tracing::warn;

use crate::domain::Limit::{Max, Unlimited};
use crate::domain::{Plan, PlanLimits};
use crate::error::DomainError;

static FREE: PlanLimits = PlanLimits {
    plan: Plan::Free,
    max_projects: Max(3),
    max_tasks: Max(100),
    max_teams: Max(1),
    max_members: Max(3),
    max_boards: Max(3),
    max_calendar_events: Max(50),
    storage_mb: Max(100),
    file_size_mb: Max(5),
    has_ai: false,
    ai_requests_per_month: Max(0),
    has_automation: false,
    max_automations: Max(0),
    has_integrations: false,
    max_integrations: Max(0),
    has_api_access: false,
    api_requests_per_month: Max(0),
    has_analytics: false,
    max_chat_messages: Max(500),
    retention_days: Max(7),
};

static GROWTH: PlanLimits = PlanLimits {
    plan: Plan::Growth,
    max_projects: Max(15),
    max_tasks: Max(1_000),
    max_teams: Max(5),
    max_members: Max(15),
    max_boards: Max(20),
    max_calendar_events: Max(500),
    storage_mb: Max(5_120),
    file_size_mb: Max(25),
    has_ai: true,
    ai_requests_per_month: Max(100),
    has_automation: true,
    max_automations: Max(10),
    has_integrations: true,
    max_integrations: Max(3),
    has_api_access: false,
    api_requests_per_month: Max(0),
    has_analytics: true,
    max_chat_messages: Max(10_000),
    retention_days: Max(30),
};

static PRO: PlanLimits = PlanLimits {
    plan: Plan::Pro,
    max_projects: Max(50),
    max_tasks: Max(10_000),
    max_teams: Max(20),
    max_members: Max(50),
    max_boards: Max(100),
    max_calendar_events: Max(5_000),
    storage_mb: Max(51_200),
    file_size_mb: Max(100),
    has_ai: true,
    ai_requests_per_month: Max(1_000),
    has_automation: true,
    max_automations: Max(50),
    has_integrations: true,
    max_integrations: Max(10),
    has_api_access: true,
    api_requests_per_month: Max(10_000),
    has_analytics: true,
    max_chat_messages: Unlimited,
    retention_days: Max(90),
};

static PLUS: PlanLimits = PlanLimits {
    plan: Plan::Plus,
    max_projects: Unlimited,
    max_tasks: Unlimited,
    max_teams: Unlimited,
    max_members: Max(200),
    max_boards: Unlimited,
    max_calendar_events: Unlimited,
    storage_mb: Max(204_800),
    file_size_mb: Max(500),
    has_ai: true,
    ai_requests_per_month: Max(5_000),
    has_automation: true,
    max_automations: Unlimited,
    has_integrations: true,
    max_integrations: Unlimited,
    has_api_access: true,
    api_requests_per_month: Max(100_000),
    has_analytics: true,
    max_chat_messages: Unlimited,
    retention_days: Max(365),
};

static LIFETIME: PlanLimits = PlanLimits {
    plan: Plan::Lifetime,
    max_projects: Unlimited,
    max_tasks: Unlimited,
    max_teams: Max(10),
    max_members: Max(25),
    max_boards: Unlimited,
    max_calendar_events: Unlimited,
    storage_mb: Max(20_480),
    file_size_mb: Max(100),
    has_ai: true,
    ai_requests_per_month: Max(300),
    has_automation: true,
    max_automations: Max(25),
    has_integrations: true,
    max_integrations: Max(5),
    has_api_access: true,
    api_requests_per_month: Max(5_000),
    has_analytics: true,
    max_chat_messages: Unlimited,
    retention_days: Unlimited,
};

/// Static plan table. Plans form a closed enum, so every lookup succeeds;
/// unknown identifiers are rejected when they are parsed into a `Plan`.
pub struct PlanCatalog;

impl PlanCatalog {
    pub fn limits_for(plan: Plan) -> &'static PlanLimits {
        match plan {
            Plan::Free => &FREE,
            Plan::Growth => &GROWTH,
            Plan::Pro => &PRO,
            Plan::Plus => &PLUS,
            Plan::Lifetime => &LIFETIME,
        }
    }

    /// Parse a stored plan id and resolve its limits in one step.
    pub fn limits_for_id(plan_id: &str) -> Result<&'static PlanLimits, DomainError> {
        let plan: Plan = plan_id.parse()?;
        Ok(Self::limits_for(plan))
    }
}

/// Maps provider product identifiers onto plans.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    overrides: HashMap<String, Plan>,
}

impl ProductCatalog {
    pub fn new(overrides: HashMap<String, Plan>) -> Self {
        Self { overrides }
    }

    /// Build from configuration, skipping entries naming unknown plans.
    pub fn from_config(raw: &HashMap<String, String>) -> Self {
        let overrides = raw
            .iter()
            .filter_map(|(product, plan)| match plan.parse::<Plan>() {
                Ok(plan) => Some((product.clone(), plan)),
                Err(e) => {
                    warn!("Ignoring product mapping {} -> {}: {}", product, plan, e);
                    None
                }
            })
            .collect();
        Self { overrides }
    }

    /// Explicit mapping first, then a tier name appearing as a whole token
    /// of the id (`growth_annual`, `team-pro-monthly`). Opaque catalog ids
    /// such as Paddle's `pro_01h...` resolve only through overrides.
    pub fn plan_for_product(&self, product_id: &str) -> Option<Plan> {
        if let Some(plan) = self.overrides.get(product_id) {
            return Some(*plan);
        }

        let id = product_id.to_ascii_lowercase();
        let tokens: Vec<&str> = id
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|token| !token.is_empty())
            .collect();
        if is_opaque_catalog_id(&tokens) {
            return None;
        }

        [Plan::Lifetime, Plan::Plus, Plan::Growth, Plan::Pro]
            .into_iter()
            .find(|plan| tokens.contains(&plan.as_str()))
    }

    pub fn is_lifetime_product(&self, product_id: &str) -> bool {
        self.plan_for_product(product_id) == Some(Plan::Lifetime)
    }
}

/// `pro_` / `pri_` followed by a generated suffix.
fn is_opaque_catalog_id(tokens: &[&str]) -> bool {
    match tokens {
        [prefix, suffix, ..] => {
            matches!(*prefix, "pro" | "pri") && suffix.chars().any(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plan_allows_three_projects() {
        assert_eq!(PlanCatalog::limits_for(Plan::Free).max_projects, Max(3));
    }

    #[test]
    fn every_plan_resolves_to_its_own_row() {
        for plan in Plan::ALL {
            assert_eq!(PlanCatalog::limits_for(plan).plan, plan);
        }
    }

    #[test]
    fn unknown_plan_id_fails_loud() {
        assert!(matches!(
            PlanCatalog::limits_for_id("platinum"),
            Err(DomainError::InvalidPlan(_))
        ));
        assert_eq!(PlanCatalog::limits_for_id("pro").unwrap().plan, Plan::Pro);
    }

    #[test]
    fn disabled_features_have_zero_caps() {
        let free = PlanCatalog::limits_for(Plan::Free);
        assert!(!free.has_ai);
        assert_eq!(free.ai_requests_per_month, Max(0));
    }

    #[test]
    fn product_mapping_prefers_overrides() {
        let catalog = ProductCatalog::new(HashMap::from([("pri_01h".to_string(), Plan::Plus)]));
        assert_eq!(catalog.plan_for_product("pri_01h"), Some(Plan::Plus));
        assert_eq!(catalog.plan_for_product("growth_annual"), Some(Plan::Growth));
        assert_eq!(catalog.plan_for_product("pro_monthly"), Some(Plan::Pro));
        assert_eq!(catalog.plan_for_product("plan_lifetime_deal"), Some(Plan::Lifetime));
        assert_eq!(catalog.plan_for_product("mystery"), None);
        assert_eq!(catalog.plan_for_product("team-pro-monthly"), Some(Plan::Pro));
    }

    #[test]
    fn tier_names_only_match_whole_tokens() {
        let catalog = ProductCatalog::default();
        assert_eq!(catalog.plan_for_product("prod_starter_monthly"), None);
        assert_eq!(catalog.plan_for_product("improved_tier"), None);
        assert_eq!(catalog.plan_for_product("surplus_seats"), None);
        assert_eq!(catalog.plan_for_product("pro_01h8xk2q9v7y"), None);
        assert_eq!(catalog.plan_for_product("pri_01h8xk2q9v7y"), None);
    }

    #[test]
    fn opaque_ids_still_resolve_through_overrides() {
        let catalog = ProductCatalog::new(HashMap::from([("pro_01h8xk2q9v7y".to_string(), Plan::Growth)]));
        assert_eq!(catalog.plan_for_product("pro_01h8xk2q9v7y"), Some(Plan::Growth));
    }

    #[test]
    fn config_entries_with_unknown_plans_are_dropped() {
        let raw = HashMap::from([
            ("a".to_string(), "pro".to_string()),
            ("b".to_string(), "gold".to_string()),
        ]);
        let catalog = ProductCatalog::from_config(&raw);
        assert_eq!(catalog.plan_for_product("a"), Some(Plan::Pro));
        assert_eq!(catalog.plan_for_product("b"), None);
    }
}
