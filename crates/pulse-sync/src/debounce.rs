use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

struct Entry {
    callback: Callback,
    delay: Duration,
    /// Timer armed by the most recent trigger. Aborted and re-armed on every
    /// trigger (cancel-before-reschedule); never more than one per key.
    pending: Option<JoinHandle<()>>,
}

/// Named, re-triggerable delayed execution.
///
/// Bursts of triggers against one key collapse to a single callback run,
/// fired one quiet period after the latest trigger. An explicit service
/// object, injected by reference — never ambient global state — so tests
/// construct isolated instances.
///
/// Must be used from within a tokio runtime; timers are spawned tasks.
#[derive(Clone)]
pub struct DebounceRegistry {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl DebounceRegistry {
    pub fn new() -> Self {
        DebounceRegistry {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create or replace the debounced wrapper stored under `key`.
    ///
    /// Re-registering replaces the callback used by the NEXT trigger; a
    /// timer already armed by an earlier trigger keeps the callback it
    /// captured at schedule time and is not cancelled.
    pub fn register<F>(&self, key: &str, delay: Duration, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut entries = self.entries.lock().expect("debounce map poisoned");
        let pending = entries.remove(key).and_then(|entry| entry.pending);
        entries.insert(
            key.to_string(),
            Entry {
                callback: Arc::new(callback),
                delay,
                pending,
            },
        );
    }

    /// Arm (or re-arm) the timer for `key`.
    ///
    /// The callback registered at this moment is captured and will run
    /// `delay` after the LATEST trigger; earlier pending timers for the key
    /// are cancelled first. Unknown keys are a silent no-op.
    pub fn trigger(&self, key: &str) {
        let mut entries = self.entries.lock().expect("debounce map poisoned");
        let Some(entry) = entries.get_mut(key) else {
            debug!(event = "sync.debounce.unknown_key", key = key);
            return;
        };

        if let Some(pending) = entry.pending.take() {
            pending.abort();
        }

        let callback = Arc::clone(&entry.callback);
        let delay = entry.delay;
        entry.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Remove the registration for `key`.
    ///
    /// An already-scheduled timer is NOT cancelled: it still fires with the
    /// callback captured when it was armed. Callers that need the callback
    /// to never run again must make the callback itself tolerate late
    /// invocation.
    pub fn clear(&self, key: &str) {
        let mut entries = self.entries.lock().expect("debounce map poisoned");
        // Dropping the JoinHandle detaches the timer task; an armed timer
        // keeps running and fires with its captured callback.
        entries.remove(key);
    }

    /// Whether a wrapper is registered under `key`.
    pub fn is_registered(&self, key: &str) -> bool {
        self.entries
            .lock()
            .expect("debounce map poisoned")
            .contains_key(key)
    }
}

impl Default for DebounceRegistry {
    fn default() -> Self {
        DebounceRegistry::new()
    }
}
