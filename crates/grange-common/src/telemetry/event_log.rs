//! Logging event publisher
//!
//! Default `EventPublisher` for deployments where the notification
//! subsystem consumes the structured log stream. Emission is best-effort;
//! serialization problems are logged and dropped.

use async_trait::async_trait;
use grange_core::{DomainEvent, EventPublisher};
use tracing::{info, warn};

/// Publishes domain events to the tracing log stream
#[derive(Debug, Clone, Default)]
pub struct LogEventPublisher;

impl LogEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(&self, event: &DomainEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => {
                info!(event_type = event.event_type(), payload = %payload, "domain event");
            }
            Err(err) => {
                warn!(event_type = event.event_type(), error = %err, "failed to serialize domain event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grange_core::events::MemberJoinedEvent;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_publish_does_not_panic() {
        let publisher = LogEventPublisher::new();
        let event = DomainEvent::MemberJoined(MemberJoinedEvent::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
        ));
        publisher.publish(&event).await;
    }
}
