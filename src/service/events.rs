//! Presence notifications published by the reminder service.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Message code carried by every presence event. Reserved for telling
/// messages apart later; always this value for now.
pub const PRESENCE_EVENT_CODE: i32 = 0;

/// Buffered events per subscriber before old ones are dropped.
const EVENT_CAPACITY: usize = 64;

/// Outbound presence transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresenceEvent {
    /// The user was declared away.
    UserLeft { code: i32 },
    /// The user came back after being away.
    UserReturned { code: i32 },
}

impl PresenceEvent {
    pub fn left() -> Self {
        Self::UserLeft {
            code: PRESENCE_EVENT_CODE,
        }
    }

    pub fn returned() -> Self {
        Self::UserReturned {
            code: PRESENCE_EVENT_CODE,
        }
    }
}

/// Fan-out of presence events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PresenceEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresenceEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn publish(&self, event: PresenceEvent) {
        let receivers = self.tx.send(event).unwrap_or(0);
        tracing::debug!(?event, receivers, "Presence event published");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.publish(PresenceEvent::left());
    }

    #[test]
    fn test_every_subscriber_receives() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(PresenceEvent::returned());

        assert_eq!(a.try_recv().unwrap(), PresenceEvent::UserReturned { code: 0 });
        assert_eq!(b.try_recv().unwrap(), PresenceEvent::UserReturned { code: 0 });
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&PresenceEvent::left()).unwrap();
        assert_eq!(json, r#"{"type":"user_left","code":0}"#);
    }
}
