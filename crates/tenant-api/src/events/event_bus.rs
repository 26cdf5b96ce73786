use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use tenant_core::error::DomainError;
use tenant_core::services::Publisher;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelEvent {
    pub channel: String,
    pub event: String,
    pub payload: Value,
}

/// In-process pub/sub. Subscribers filter by channel.
pub struct EventBus {
    tx: broadcast::Sender<ChannelEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.tx.subscribe()
    }
}

impl Publisher for EventBus {
    /// Never fails: with nobody listening the event is dropped and logged.
    fn publish(&self, channel: &str, event: &str, payload: Value) -> Result<(), DomainError> {
        let message = ChannelEvent {
            channel: channel.to_string(),
            event: event.to_string(),
            payload,
        };
        match self.tx.send(message) {
            Ok(receivers) => debug!(channel, event, receivers, "Event published"),
            Err(e) => warn!(channel, event, "Failed to publish event (maybe no subscribers): {}", e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish("workspace:ws-1", "billing.succeeded", json!({ "plan": "pro" }))
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.channel, "workspace:ws-1");
        assert_eq!(received.event, "billing.succeeded");
        assert_eq!(received.payload["plan"], "pro");
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let bus = EventBus::new(8);
        assert!(bus.publish("workspace:ws-1", "billing.payment_failed", json!({})).is_ok());
    }
}
