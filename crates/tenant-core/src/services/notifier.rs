//! Notification ports. Every notification is best effort: callers log
//! failures and carry on.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tenant_shared::utils::{mask_email, workspace_channel};

use crate::domain::Workspace;
use crate::error::DomainError;

/// Realtime pub/sub transport.
pub trait Publisher: Send + Sync {
    fn publish(&self, channel: &str, event: &str, payload: Value) -> Result<(), DomainError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingNotifier: Send + Sync {
    async fn subscription_activated(&self, workspace: &Workspace) -> Result<(), DomainError>;
    async fn payment_failed(&self, workspace: &Workspace, contact: &str) -> Result<(), DomainError>;
}

/// Broadcasts billing notifications on the workspace's channel.
pub struct PublishingNotifier {
    publisher: Arc<dyn Publisher>,
}

impl PublishingNotifier {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl BillingNotifier for PublishingNotifier {
    async fn subscription_activated(&self, workspace: &Workspace) -> Result<(), DomainError> {
        self.publisher.publish(
            &workspace_channel(&workspace.id),
            "billing.succeeded",
            json!({
                "plan": workspace.plan,
                "billing_interval": workspace.billing_interval,
                "next_billing_date": workspace.next_billing_date,
            }),
        )
    }

    async fn payment_failed(&self, workspace: &Workspace, contact: &str) -> Result<(), DomainError> {
        self.publisher.publish(
            &workspace_channel(&workspace.id),
            "billing.payment_failed",
            json!({
                "plan": workspace.plan,
                "contact": mask_email(contact),
            }),
        )
    }
}
