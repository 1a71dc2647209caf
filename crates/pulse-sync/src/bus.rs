use pulse_protocol::{RefreshParams, TaskStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// All sync-layer happenings broadcast to the rest of the application.
///
/// Each variant describes _what was observed_, not what should happen.
/// Polling-driven and push-driven observations produce the same variants,
/// so downstream consumers cannot tell (and must not care) which path
/// delivered an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncEvent {
    /// A task's status was observed via a poll tick or a push frame.
    TaskStatusChanged {
        task_id: String,
        status: TaskStatus,
        result_url: Option<String>,
        error_message: Option<String>,
        observed_at: String,
    },
    /// The wallet/points balance changed.
    WalletPointsChanged {
        user_id: Option<String>,
        points: f64,
    },
    /// Coalesced request to re-query the visible task list.
    RefreshRequested(RefreshParams),
}

/// Typed in-process publish/subscribe channel.
///
/// A thin wrapper over a tokio broadcast channel. Publishing never blocks
/// and never fails: with no subscribers the event is dropped, and a lagged
/// subscriber skips old events rather than stalling publishers — refresh
/// signals are hints, not a durable queue.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        EventBus { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: SyncEvent) {
        if self.tx.send(event).is_err() {
            debug!(event = "sync.bus.no_subscribers");
        }
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(SyncEvent::WalletPointsChanged {
            user_id: Some("u-1".to_string()),
            points: 42.0,
        });

        match rx.recv().await.unwrap() {
            SyncEvent::WalletPointsChanged { user_id, points } => {
                assert_eq!(user_id.as_deref(), Some("u-1"));
                assert_eq!(points, 42.0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        // Must not panic or block.
        bus.publish(SyncEvent::RefreshRequested(RefreshParams::default()));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_only_later_events() {
        let bus = EventBus::new();
        bus.publish(SyncEvent::WalletPointsChanged {
            user_id: None,
            points: 1.0,
        });

        let mut rx = bus.subscribe();
        bus.publish(SyncEvent::WalletPointsChanged {
            user_id: None,
            points: 2.0,
        });

        match rx.recv().await.unwrap() {
            SyncEvent::WalletPointsChanged { points, .. } => assert_eq!(points, 2.0),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_event_serde_roundtrip() {
        let event = SyncEvent::TaskStatusChanged {
            task_id: "abc123".to_string(),
            status: TaskStatus::Running,
            result_url: None,
            error_message: None,
            observed_at: "2026-08-01T10:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: SyncEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
