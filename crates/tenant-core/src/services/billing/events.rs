//! Provider-neutral webhook payloads.
//!
//! Only the fields the plan and billing columns consume are modelled; the
//! raw `data` object is kept so it can be stored as audit metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(alias = "id", default)]
    pub event_id: Option<String>,
    #[serde(alias = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl WebhookEvent {
    /// Decode one raw batch item.
    pub fn decode(raw: &Value) -> Result<Self, DomainError> {
        WebhookEvent::deserialize(raw)
            .map_err(|e| DomainError::WebhookProcessing(format!("Malformed webhook event: {}", e)))
    }
}

/// Accepted request bodies: `{"events": [...]}`, a bare array, or a single
/// event object. Items stay raw so one malformed event cannot reject the
/// rest of the batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WebhookEnvelope {
    Batch { events: Vec<Value> },
    List(Vec<Value>),
    Single(Map<String, Value>),
}

impl WebhookEnvelope {
    pub fn into_events(self) -> Vec<Value> {
        match self {
            WebhookEnvelope::Batch { events } => events,
            WebhookEnvelope::List(events) => events,
            WebhookEnvelope::Single(event) => vec![Value::Object(event)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubscriptionData {
    #[serde(default)]
    pub workspace_id: Option<String>,
    pub subscription_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub billing_interval: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub next_billed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Explicit deactivation signal on cancellation events.
    #[serde(default)]
    pub deactivated: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderData {
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PaymentData {
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    SubscriptionActivated(SubscriptionData),
    SubscriptionUpdated(SubscriptionData),
    SubscriptionCanceled { data: SubscriptionData, deactivate: bool },
    OrderCompleted(OrderData),
    PaymentFailed(PaymentData),
    Unknown(String),
}

impl BillingEvent {
    /// Unknown event types parse to `Unknown`; a known type whose payload
    /// lacks required fields is a processing error.
    pub fn parse(event: &WebhookEvent) -> Result<Self, DomainError> {
        let parsed = match event.event_type.as_str() {
            "subscription.activated" | "subscription.created" => {
                BillingEvent::SubscriptionActivated(payload(event)?)
            }
            "subscription.updated" => BillingEvent::SubscriptionUpdated(payload(event)?),
            "subscription.canceled" | "subscription.cancelled" | "subscription.deactivated" => {
                let data: SubscriptionData = payload(event)?;
                let deactivate = event.event_type == "subscription.deactivated"
                    || data.deactivated
                    || data.status.as_deref() == Some("deactivated");
                BillingEvent::SubscriptionCanceled { data, deactivate }
            }
            "order.completed" => BillingEvent::OrderCompleted(payload(event)?),
            "payment.failed" => BillingEvent::PaymentFailed(payload(event)?),
            other => BillingEvent::Unknown(other.to_string()),
        };
        Ok(parsed)
    }
}

fn payload<T: serde::de::DeserializeOwned>(event: &WebhookEvent) -> Result<T, DomainError> {
    serde_json::from_value(event.data.clone()).map_err(|e| {
        DomainError::WebhookProcessing(format!("Invalid {} payload: {}", event.event_type, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_accepts_all_body_shapes() {
        let single = json!({ "id": "evt_1", "type": "payment.failed", "data": {} });
        let batch = json!({ "events": [single.clone(), single.clone()] });
        let list = json!([single.clone()]);

        let count = |v: Value| serde_json::from_value::<WebhookEnvelope>(v).unwrap().into_events().len();
        assert_eq!(count(single), 1);
        assert_eq!(count(batch), 2);
        assert_eq!(count(list), 1);
    }

    #[test]
    fn batch_with_a_malformed_item_still_parses() {
        let body = json!({
            "events": [
                { "id": "evt_1", "type": "payment.failed", "data": {} },
                { "id": "evt_2", "data": {} }
            ]
        });
        let events = serde_json::from_value::<WebhookEnvelope>(body).unwrap().into_events();
        assert_eq!(events.len(), 2);
        assert!(WebhookEvent::decode(&events[0]).is_ok());
        assert!(matches!(
            WebhookEvent::decode(&events[1]),
            Err(DomainError::WebhookProcessing(_))
        ));
    }

    #[test]
    fn scalar_bodies_are_rejected() {
        assert!(serde_json::from_value::<WebhookEnvelope>(json!("payment.failed")).is_err());
        assert!(serde_json::from_value::<WebhookEnvelope>(json!(42)).is_err());
    }

    #[test]
    fn unknown_types_are_not_errors() {
        let event = WebhookEvent {
            event_id: None,
            event_type: "invoice.drafted".to_string(),
            data: json!({}),
        };
        assert_eq!(
            BillingEvent::parse(&event).unwrap(),
            BillingEvent::Unknown("invoice.drafted".to_string())
        );
    }

    #[test]
    fn deactivation_signals() {
        let event = |event_type: &str, data: Value| WebhookEvent {
            event_id: None,
            event_type: event_type.to_string(),
            data,
        };
        let deactivates = |e: WebhookEvent| match BillingEvent::parse(&e).unwrap() {
            BillingEvent::SubscriptionCanceled { deactivate, .. } => deactivate,
            other => panic!("unexpected {:?}", other),
        };

        assert!(!deactivates(event("subscription.canceled", json!({ "subscription_id": "s" }))));
        assert!(deactivates(event("subscription.deactivated", json!({ "subscription_id": "s" }))));
        assert!(deactivates(event(
            "subscription.canceled",
            json!({ "subscription_id": "s", "deactivated": true })
        )));
        assert!(deactivates(event(
            "subscription.canceled",
            json!({ "subscription_id": "s", "status": "deactivated" })
        )));
    }

    #[test]
    fn missing_subscription_id_is_a_processing_error() {
        let event = WebhookEvent {
            event_id: Some("evt".to_string()),
            event_type: "subscription.updated".to_string(),
            data: json!({ "status": "active" }),
        };
        assert!(matches!(
            BillingEvent::parse(&event),
            Err(DomainError::WebhookProcessing(_))
        ));
    }
}
