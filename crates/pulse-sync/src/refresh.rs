use std::sync::{Arc, Mutex};
use std::time::Duration;

use pulse_protocol::RefreshParams;
use tracing::debug;

use crate::bus::{EventBus, SyncEvent};
use crate::debounce::DebounceRegistry;

/// Debounce key shared by every refresh trigger site.
pub const REFRESH_KEY: &str = "refresh_task_list";

/// Collapses many independent "task list changed" signals into one delayed
/// [`SyncEvent::RefreshRequested`] broadcast.
///
/// Submit handlers, poll ticks, and push events all call
/// [`request_refresh`](Self::request_refresh); within one debounce window
/// only the final call's parameters are honored (last-write-wins), so an
/// earlier call's task-id hint may be dropped by a later, unrelated call.
/// Receivers re-query their OWN current filters and treat the parameters as
/// overrides, which makes that loss acceptable.
#[derive(Clone)]
pub struct RefreshCoalescer {
    registry: DebounceRegistry,
    slot: Arc<Mutex<RefreshParams>>,
}

impl RefreshCoalescer {
    /// Wire the coalescer onto a registry and bus.
    ///
    /// Registers the broadcast callback under [`REFRESH_KEY`] once; the
    /// callback reads the latest parameter slot at fire time.
    pub fn new(registry: DebounceRegistry, bus: EventBus, delay: Duration) -> Self {
        let slot = Arc::new(Mutex::new(RefreshParams::default()));

        let fire_slot = Arc::clone(&slot);
        registry.register(REFRESH_KEY, delay, move || {
            let params = fire_slot.lock().expect("refresh slot poisoned").clone();
            debug!(
                event = "sync.refresh.broadcast",
                task_id = params.task_id.as_deref().unwrap_or(""),
                page = params.page,
            );
            bus.publish(SyncEvent::RefreshRequested(params));
        });

        RefreshCoalescer { registry, slot }
    }

    /// Request a task-list refresh.
    ///
    /// Replaces the shared parameter slot with this call's merged parameters
    /// and (re-)arms the debounce timer.
    pub fn request_refresh(&self, task_id: Option<&str>, base: RefreshParams) {
        let params = RefreshParams::for_request(task_id, base);
        *self.slot.lock().expect("refresh slot poisoned") = params;
        self.registry.trigger(REFRESH_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    const DELAY: Duration = Duration::from_millis(400);

    async fn advance(ms: u64) {
        tokio::time::advance(Duration::from_millis(ms)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_params() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let coalescer = RefreshCoalescer::new(DebounceRegistry::new(), bus, DELAY);

        coalescer.request_refresh(Some("task-1"), RefreshParams::default());
        advance(100).await;
        coalescer.request_refresh(Some("task-2"), RefreshParams::default());
        advance(100).await;
        coalescer.request_refresh(
            None,
            RefreshParams {
                page: 3,
                ..Default::default()
            },
        );

        advance(401).await;

        match rx.try_recv().unwrap() {
            SyncEvent::RefreshRequested(params) => {
                // task-1 and task-2 hints were overwritten by the final call.
                assert_eq!(params.task_id, None);
                assert_eq!(params.page, 3);
                assert!(params.force_refresh);
                assert!(!params.use_stored_params);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_fire_separately() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let coalescer = RefreshCoalescer::new(DebounceRegistry::new(), bus, DELAY);

        coalescer.request_refresh(Some("task-1"), RefreshParams::default());
        advance(401).await;
        coalescer.request_refresh(Some("task-2"), RefreshParams::default());
        advance(401).await;

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        match (first, second) {
            (SyncEvent::RefreshRequested(a), SyncEvent::RefreshRequested(b)) => {
                assert_eq!(a.task_id.as_deref(), Some("task-1"));
                assert_eq!(b.task_id.as_deref(), Some("task-2"));
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_registry_key_is_fixed() {
        let registry = DebounceRegistry::new();
        let bus = EventBus::new();
        let _coalescer = RefreshCoalescer::new(registry.clone(), bus, DELAY);
        assert!(registry.is_registered(REFRESH_KEY));
    }
}
