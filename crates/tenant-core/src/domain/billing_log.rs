//! Billing log entity (append-only audit trail)

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::workspace::BillingProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingAction {
    SubscriptionActivated,
    SubscriptionUpdated,
    SubscriptionCanceled,
    SubscriptionDeactivated,
    OrderCompletedLifetime,
    PaymentFailed,
    PlanChangedManually,
}

impl BillingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingAction::SubscriptionActivated => "subscription_activated",
            BillingAction::SubscriptionUpdated => "subscription_updated",
            BillingAction::SubscriptionCanceled => "subscription_canceled",
            BillingAction::SubscriptionDeactivated => "subscription_deactivated",
            BillingAction::OrderCompletedLifetime => "order_completed_lifetime",
            BillingAction::PaymentFailed => "payment_failed",
            BillingAction::PlanChangedManually => "plan_changed_manually",
        }
    }
}

impl fmt::Display for BillingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit row per state-changing billing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingLogEntry {
    pub id: Uuid,
    pub workspace_id: String,
    pub action: String,
    pub provider: BillingProvider,
    /// Amount in the currency's minor unit.
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl BillingLogEntry {
    pub fn new(
        workspace_id: impl Into<String>,
        action: BillingAction,
        provider: BillingProvider,
        metadata: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.into(),
            action: action.as_str().to_string(),
            provider,
            amount_cents: None,
            currency: None,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn with_amount(mut self, amount_cents: Option<i64>, currency: Option<String>) -> Self {
        self.amount_cents = amount_cents;
        self.currency = currency;
        self
    }
}
