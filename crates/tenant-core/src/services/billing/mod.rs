//! Billing webhook events and the state machine that applies them

pub mod events;
pub mod state_machine;

pub use events::{BillingEvent, LineItem, OrderData, PaymentData, SubscriptionData, WebhookEnvelope, WebhookEvent};
pub use state_machine::{BatchReport, BillingStateMachine, EventOutcome, FailedEvent};
