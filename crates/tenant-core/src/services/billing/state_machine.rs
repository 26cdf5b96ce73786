// ============================================================================
// Tenant Core - Billing State Machine
// File: crates/tenant-core/src/services/billing/state_machine.rs
// ============================================================================
//! Applies provider webhook events to workspace billing state.
//!
//! Each applied event writes the workspace first, then appends exactly one
//! billing log entry. Handlers set fields to absolute values, so replaying
//! an event converges on the same workspace state.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::events::{BillingEvent, OrderData, PaymentData, SubscriptionData, WebhookEvent};
use crate::domain::{
    BillingAction, BillingInterval, BillingLogEntry, BillingProvider, BillingStatus, Plan, Workspace,
};
use crate::error::DomainError;
use crate::repositories::{BillingLogRepository, WorkspaceRepository};
use crate::services::notifier::BillingNotifier;
use crate::services::plan_catalog::ProductCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied(BillingAction),
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedEvent {
    pub event_id: Option<String>,
    pub event_type: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub ignored: usize,
    pub failed: usize,
    pub failures: Vec<FailedEvent>,
}

impl BatchReport {
    fn record_failure(
        &mut self,
        provider: BillingProvider,
        event_id: Option<String>,
        event_type: String,
        e: &DomainError,
    ) {
        error!(
            provider = provider.as_str(),
            event_id = event_id.as_deref().unwrap_or("-"),
            event_type = %event_type,
            retryable = e.is_retryable(),
            "Webhook event failed: {}",
            e
        );
        self.failed += 1;
        self.failures.push(FailedEvent {
            event_id,
            event_type,
            error: e.to_string(),
        });
    }
}

pub struct BillingStateMachine {
    workspaces: Arc<dyn WorkspaceRepository>,
    billing_logs: Arc<dyn BillingLogRepository>,
    notifier: Arc<dyn BillingNotifier>,
    products: ProductCatalog,
}

impl BillingStateMachine {
    pub fn new(
        workspaces: Arc<dyn WorkspaceRepository>,
        billing_logs: Arc<dyn BillingLogRepository>,
        notifier: Arc<dyn BillingNotifier>,
        products: ProductCatalog,
    ) -> Self {
        Self {
            workspaces,
            billing_logs,
            notifier,
            products,
        }
    }

    /// Process events one at a time in order. A malformed or failing event
    /// is logged and recorded in the report; the rest of the batch still runs.
    pub async fn process_batch(&self, provider: BillingProvider, events: Vec<Value>) -> BatchReport {
        let mut report = BatchReport::default();

        for raw in &events {
            let event = match WebhookEvent::decode(raw) {
                Ok(event) => event,
                Err(e) => {
                    let event_id = raw_field(raw, &["id", "event_id"]);
                    let event_type = raw_field(raw, &["type", "event_type"]).unwrap_or_else(|| "unknown".to_string());
                    report.record_failure(provider, event_id, event_type, &e);
                    continue;
                }
            };

            match self.handle(provider, &event).await {
                Ok(EventOutcome::Applied(_)) => report.processed += 1,
                Ok(EventOutcome::Ignored) => report.ignored += 1,
                Err(e) => report.record_failure(provider, event.event_id, event.event_type, &e),
            }
        }

        info!(
            provider = provider.as_str(),
            processed = report.processed,
            ignored = report.ignored,
            failed = report.failed,
            "Webhook batch handled"
        );
        report
    }

    pub async fn handle(&self, provider: BillingProvider, event: &WebhookEvent) -> Result<EventOutcome, DomainError> {
        let action = match BillingEvent::parse(event)? {
            BillingEvent::SubscriptionActivated(data) => self.activate(provider, event, data).await?,
            BillingEvent::SubscriptionUpdated(data) => self.update_subscription(provider, event, data).await?,
            BillingEvent::SubscriptionCanceled { data, deactivate } => {
                self.cancel(provider, event, data, deactivate).await?
            }
            BillingEvent::OrderCompleted(data) => match self.complete_order(provider, event, data).await? {
                Some(action) => action,
                None => return Ok(EventOutcome::Ignored),
            },
            BillingEvent::PaymentFailed(data) => self.payment_failed(provider, event, data).await?,
            BillingEvent::Unknown(event_type) => {
                info!(provider = provider.as_str(), event_type = %event_type, "Ignoring unhandled webhook event");
                return Ok(EventOutcome::Ignored);
            }
        };
        Ok(EventOutcome::Applied(action))
    }

    async fn activate(
        &self,
        provider: BillingProvider,
        event: &WebhookEvent,
        data: SubscriptionData,
    ) -> Result<BillingAction, DomainError> {
        let mut workspace = self
            .resolve(data.workspace_id.as_deref(), Some(&data.subscription_id))
            .await?;

        let plan = match data.product_id.as_deref() {
            Some(product_id) => self.plan_for(product_id)?,
            None => workspace.plan,
        };

        workspace.plan = plan;
        workspace.billing_provider = provider;
        workspace.billing_status = BillingStatus::Active;
        workspace.subscription_id = Some(data.subscription_id.clone());
        apply_interval(&mut workspace, data.billing_interval.as_deref());
        if data.customer_id.is_some() {
            workspace.customer_id = data.customer_id.clone();
        }
        if data.customer_email.is_some() {
            workspace.billing_email = data.customer_email.clone();
        }
        if data.currency.is_some() {
            workspace.currency = data.currency.clone();
        }
        workspace.next_billing_date = data.next_billed_at;
        workspace.touch();

        let workspace = self.workspaces.update(&workspace).await?;
        let action = BillingAction::SubscriptionActivated;
        self.append_log(&workspace, action, provider, event, data.amount_cents, data.currency)
            .await?;

        if let Err(e) = self.notifier.subscription_activated(&workspace).await {
            warn!(workspace_id = %workspace.id, "Billing success notification failed: {}", e);
        }

        info!(workspace_id = %workspace.id, plan = %workspace.plan, "Subscription activated");
        Ok(action)
    }

    async fn update_subscription(
        &self,
        provider: BillingProvider,
        event: &WebhookEvent,
        data: SubscriptionData,
    ) -> Result<BillingAction, DomainError> {
        let mut workspace = self
            .resolve(data.workspace_id.as_deref(), Some(&data.subscription_id))
            .await?;

        if let Some(product_id) = data.product_id.as_deref() {
            workspace.plan = self.plan_for(product_id)?;
        }
        apply_interval(&mut workspace, data.billing_interval.as_deref());
        workspace.billing_status = match data.status.as_deref() {
            Some("active") => BillingStatus::Active,
            _ => BillingStatus::Canceled,
        };
        workspace.next_billing_date = data.next_billed_at;
        workspace.touch();

        let workspace = self.workspaces.update(&workspace).await?;
        let action = BillingAction::SubscriptionUpdated;
        self.append_log(&workspace, action, provider, event, data.amount_cents, data.currency)
            .await?;

        info!(
            workspace_id = %workspace.id,
            plan = %workspace.plan,
            status = workspace.billing_status.as_str(),
            "Subscription updated"
        );
        Ok(action)
    }

    async fn cancel(
        &self,
        provider: BillingProvider,
        event: &WebhookEvent,
        data: SubscriptionData,
        deactivate: bool,
    ) -> Result<BillingAction, DomainError> {
        let mut workspace = self
            .resolve(data.workspace_id.as_deref(), Some(&data.subscription_id))
            .await?;

        let action = if deactivate {
            workspace.deactivate();
            BillingAction::SubscriptionDeactivated
        } else {
            workspace.cancel();
            BillingAction::SubscriptionCanceled
        };

        let workspace = self.workspaces.update(&workspace).await?;
        self.append_log(&workspace, action, provider, event, None, None).await?;

        info!(workspace_id = %workspace.id, action = action.as_str(), "Subscription ended");
        Ok(action)
    }

    /// `None` when no line item is a lifetime product.
    async fn complete_order(
        &self,
        provider: BillingProvider,
        event: &WebhookEvent,
        data: OrderData,
    ) -> Result<Option<BillingAction>, DomainError> {
        let lifetime = data
            .items
            .iter()
            .any(|item| self.products.is_lifetime_product(&item.product_id));
        if !lifetime {
            debug!(order_id = ?data.order_id, "Order has no lifetime item, ignoring");
            return Ok(None);
        }

        let mut workspace = self.resolve(data.workspace_id.as_deref(), None).await?;
        workspace.grant_lifetime(provider, data.order_id.clone());
        if data.customer_id.is_some() {
            workspace.customer_id = data.customer_id.clone();
        }
        if data.customer_email.is_some() {
            workspace.billing_email = data.customer_email.clone();
        }
        if data.currency.is_some() {
            workspace.currency = data.currency.clone();
        }

        let workspace = self.workspaces.update(&workspace).await?;
        let action = BillingAction::OrderCompletedLifetime;
        self.append_log(&workspace, action, provider, event, data.amount_cents, data.currency)
            .await?;

        info!(workspace_id = %workspace.id, "Lifetime plan granted");
        Ok(Some(action))
    }

    async fn payment_failed(
        &self,
        provider: BillingProvider,
        event: &WebhookEvent,
        data: PaymentData,
    ) -> Result<BillingAction, DomainError> {
        let mut workspace = self
            .resolve(data.workspace_id.as_deref(), data.subscription_id.as_deref())
            .await?;
        workspace.mark_past_due();

        let workspace = self.workspaces.update(&workspace).await?;
        let action = BillingAction::PaymentFailed;
        self.append_log(&workspace, action, provider, event, data.amount_cents, data.currency)
            .await?;

        match workspace.billing_email.as_deref() {
            Some(contact) => {
                if let Err(e) = self.notifier.payment_failed(&workspace, contact).await {
                    warn!(workspace_id = %workspace.id, "Payment failure notification failed: {}", e);
                }
            }
            None => debug!(workspace_id = %workspace.id, "No billing contact on file"),
        }

        warn!(workspace_id = %workspace.id, reason = ?data.reason, "Payment failed, workspace past due");
        Ok(action)
    }

    /// Direct lookup by workspace id, else a scatter lookup by the external
    /// subscription id.
    async fn resolve(&self, workspace_id: Option<&str>, subscription_id: Option<&str>) -> Result<Workspace, DomainError> {
        if let Some(id) = workspace_id {
            if let Some(workspace) = self.workspaces.find_by_id(id).await? {
                return Ok(workspace);
            }
            debug!(workspace_id = id, "Workspace id from payload not found, trying subscription");
        }

        if let Some(subscription_id) = subscription_id {
            if let Some(workspace) = self.workspaces.find_by_subscription_id(subscription_id).await? {
                return Ok(workspace);
            }
        }

        let key = workspace_id.or(subscription_id).unwrap_or("<none>");
        Err(DomainError::TenantNotFound(key.to_string()))
    }

    fn plan_for(&self, product_id: &str) -> Result<Plan, DomainError> {
        self.products
            .plan_for_product(product_id)
            .ok_or_else(|| DomainError::WebhookProcessing(format!("No plan mapped to product {}", product_id)))
    }

    async fn append_log(
        &self,
        workspace: &Workspace,
        action: BillingAction,
        provider: BillingProvider,
        event: &WebhookEvent,
        amount_cents: Option<i64>,
        currency: Option<String>,
    ) -> Result<(), DomainError> {
        let entry = BillingLogEntry::new(&workspace.id, action, provider, audit_metadata(event))
            .with_amount(amount_cents, currency);

        self.billing_logs.append(&entry).await.map_err(|e| {
            error!(
                workspace_id = %workspace.id,
                action = action.as_str(),
                "Billing log write failed after state change: {}",
                e
            );
            DomainError::BillingLogWriteFailed {
                workspace_id: workspace.id.clone(),
                reason: e.to_string(),
            }
        })
    }
}

fn raw_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn apply_interval(workspace: &mut Workspace, raw: Option<&str>) {
    if let Some(raw) = raw {
        match raw.parse::<BillingInterval>() {
            Ok(interval) => workspace.billing_interval = interval,
            Err(_) => warn!(workspace_id = %workspace.id, interval = raw, "Unknown billing interval, keeping current"),
        }
    }
}

fn audit_metadata(event: &WebhookEvent) -> Value {
    json!({
        "event_id": event.event_id,
        "event_type": event.event_type,
        "data": event.data,
    })
}
