// ============================================================================
// Tenant Core - Workspace Entity
// File: crates/tenant-core/src/domain/workspace.rs
// Description: Workspace (tenant) entity with billing state
// ============================================================================

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenant_shared::{new_workspace_id, WorkspaceId};
use validator::Validate;

use crate::domain::plan::Plan;
use crate::error::DomainError;

/// Payment provider that owns the workspace's subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingProvider {
    None,
    Paddle,
    LemonSqueezy,
}

impl BillingProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingProvider::None => "none",
            BillingProvider::Paddle => "paddle",
            BillingProvider::LemonSqueezy => "lemon_squeezy",
        }
    }
}

impl FromStr for BillingProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(BillingProvider::None),
            "paddle" => Ok(BillingProvider::Paddle),
            "lemon_squeezy" | "lemonsqueezy" => Ok(BillingProvider::LemonSqueezy),
            other => Err(DomainError::ValidationError(format!(
                "unknown billing provider: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for BillingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Active,
    PastDue,
    Canceled,
    Deactivated,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Active => "active",
            BillingStatus::PastDue => "past_due",
            BillingStatus::Canceled => "canceled",
            BillingStatus::Deactivated => "deactivated",
        }
    }
}

impl FromStr for BillingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(BillingStatus::Active),
            "past_due" => Ok(BillingStatus::PastDue),
            "canceled" | "cancelled" => Ok(BillingStatus::Canceled),
            "deactivated" => Ok(BillingStatus::Deactivated),
            other => Err(DomainError::ValidationError(format!(
                "unknown billing status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    #[serde(alias = "month")]
    Monthly,
    #[serde(alias = "year", alias = "yearly", alias = "annually")]
    Annual,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Monthly => "monthly",
            BillingInterval::Annual => "annual",
        }
    }
}

impl FromStr for BillingInterval {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" | "month" => Ok(BillingInterval::Monthly),
            "annual" | "annually" | "year" | "yearly" => Ok(BillingInterval::Annual),
            other => Err(DomainError::ValidationError(format!(
                "unknown billing interval: {}",
                other
            ))),
        }
    }
}

/// Workspace entity, the unit of isolation and billing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Workspace {
    pub id: WorkspaceId,

    #[validate(length(min = 2, max = 100, message = "Workspace name must be between 2 and 100 characters"))]
    pub name: String,

    pub plan: Plan,
    pub billing_provider: BillingProvider,
    pub billing_status: BillingStatus,
    pub billing_interval: BillingInterval,

    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
    pub order_id: Option<String>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub currency: Option<String>,
    pub is_lifetime: bool,

    #[validate(email(message = "Billing email must be a valid address"))]
    pub billing_email: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// New workspaces start on the free plan with an active status.
    pub fn new(name: String) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let workspace = Self {
            id: new_workspace_id(),
            name: name.trim().to_string(),
            plan: Plan::Free,
            billing_provider: BillingProvider::None,
            billing_status: BillingStatus::Active,
            billing_interval: BillingInterval::Monthly,
            subscription_id: None,
            customer_id: None,
            order_id: None,
            next_billing_date: None,
            currency: None,
            is_lifetime: false,
            billing_email: None,
            created_at: now,
            updated_at: now,
        };

        workspace.validate()?;
        Ok(workspace)
    }

    pub fn is_deactivated(&self) -> bool {
        self.billing_status == BillingStatus::Deactivated
    }

    pub fn change_plan(&mut self, plan: Plan) {
        self.plan = plan;
        self.touch();
    }

    pub fn mark_past_due(&mut self) {
        self.billing_status = BillingStatus::PastDue;
        self.touch();
    }

    /// Cancellation keeps the current plan until it expires.
    pub fn cancel(&mut self) {
        self.billing_status = BillingStatus::Canceled;
        self.touch();
    }

    /// Deactivation drops the workspace back to the free plan.
    pub fn deactivate(&mut self) {
        self.billing_status = BillingStatus::Deactivated;
        self.plan = Plan::Free;
        self.touch();
    }

    pub fn grant_lifetime(&mut self, provider: BillingProvider, order_id: Option<String>) {
        self.plan = Plan::Lifetime;
        self.is_lifetime = true;
        self.billing_status = BillingStatus::Active;
        self.billing_provider = provider;
        self.subscription_id = None;
        self.next_billing_date = None;
        if order_id.is_some() {
            self.order_id = order_id;
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_workspace_starts_free_and_active() {
        let ws = Workspace::new("  Acme  ".to_string()).unwrap();
        assert_eq!(ws.name, "Acme");
        assert_eq!(ws.plan, Plan::Free);
        assert_eq!(ws.billing_status, BillingStatus::Active);
        assert_eq!(ws.billing_provider, BillingProvider::None);
        assert!(!ws.is_lifetime);
        assert!(!ws.id.is_empty());
    }

    #[test]
    fn rejects_short_names() {
        assert!(Workspace::new("x".to_string()).is_err());
    }

    #[test]
    fn deactivation_downgrades_but_cancellation_keeps_plan() {
        let mut ws = Workspace::new("Acme".to_string()).unwrap();
        ws.change_plan(Plan::Pro);

        ws.cancel();
        assert_eq!(ws.plan, Plan::Pro);
        assert_eq!(ws.billing_status, BillingStatus::Canceled);

        ws.deactivate();
        assert_eq!(ws.plan, Plan::Free);
        assert!(ws.is_deactivated());
    }

    #[test]
    fn interval_accepts_provider_spellings() {
        let interval: BillingInterval = serde_json::from_str("\"year\"").unwrap();
        assert_eq!(interval, BillingInterval::Annual);
        assert_eq!("month".parse::<BillingInterval>().unwrap(), BillingInterval::Monthly);
    }
}
