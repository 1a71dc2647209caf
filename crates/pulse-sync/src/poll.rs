use std::sync::{Arc, Mutex};
use std::time::Duration;

use pulse_protocol::{RefreshParams, Task};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::{EventBus, SyncEvent};
use crate::config::SyncConfig;
use crate::fetch::StatusFetch;
use crate::refresh::RefreshCoalescer;

/// Poll timing and limits.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between ticks, and between retries after a failed tick.
    pub check_interval: Duration,
    /// Retries after the initial attempt before giving up. A session that
    /// only ever fails performs `max_retries + 1` fetches total.
    pub max_retries: u32,
    /// Master switch; a disabled controller ignores `start()`.
    pub enabled: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            check_interval: Duration::from_millis(1000),
            max_retries: 5,
            enabled: true,
        }
    }
}

impl From<&SyncConfig> for PollConfig {
    fn from(config: &SyncConfig) -> Self {
        PollConfig {
            check_interval: config.check_interval(),
            max_retries: config.max_retries,
            enabled: true,
        }
    }
}

struct Session {
    task_id: String,
    cancel: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

/// Per-task polling state machine.
///
/// `Idle -> Polling -> Idle`, leaving `Polling` when a terminal status is
/// observed, retries are exhausted, the controller is stopped, or the
/// surface goes hidden. Ticks within a session are strictly sequential: the
/// next delay is armed only after the previous fetch settles, so requests
/// never overlap for one session. Sessions for different controllers are
/// fully independent.
///
/// Polling is best-effort: fetch failures are retried on the flat
/// `check_interval` and then abandoned with only a log line — worst case
/// the display stops updating until something else refreshes it.
pub struct PollController {
    fetcher: Arc<dyn StatusFetch>,
    config: PollConfig,
    bus: Option<EventBus>,
    coalescer: Option<RefreshCoalescer>,
    visibility: Option<watch::Receiver<bool>>,
    session: Mutex<Session>,
}

impl PollController {
    pub fn new(task_id: impl Into<String>, fetcher: Arc<dyn StatusFetch>, config: PollConfig) -> Self {
        PollController {
            fetcher,
            config,
            bus: None,
            coalescer: None,
            visibility: None,
            session: Mutex::new(Session {
                task_id: task_id.into(),
                cancel: None,
                handle: None,
            }),
        }
    }

    /// Publish each observed snapshot as a [`SyncEvent::TaskStatusChanged`].
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Nudge the refresh coalescer after every successful tick.
    pub fn with_coalescer(mut self, coalescer: RefreshCoalescer) -> Self {
        self.coalescer = Some(coalescer);
        self
    }

    /// Couple the session to a visibility signal: force-stop while hidden,
    /// restart from a fresh tick (retry counter reset) on regain.
    pub fn with_visibility(mut self, visibility: watch::Receiver<bool>) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Start polling. No-op while already polling (at-most-one-timer), when
    /// no task id is bound, or when polling is disabled.
    pub fn start(&self) {
        let mut session = self.session.lock().expect("poll session poisoned");

        if session.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!(event = "sync.poll.already_polling", task_id = %session.task_id);
            return;
        }
        if session.task_id.is_empty() || !self.config.enabled {
            debug!(event = "sync.poll.start_skipped", task_id = %session.task_id);
            return;
        }

        let cancel = CancellationToken::new();
        let worker = SessionWorker {
            task_id: session.task_id.clone(),
            fetcher: Arc::clone(&self.fetcher),
            config: self.config.clone(),
            bus: self.bus.clone(),
            coalescer: self.coalescer.clone(),
            visibility: self.visibility.clone(),
            cancel: cancel.clone(),
        };

        info!(event = "sync.poll.started", task_id = %session.task_id);
        session.handle = Some(tokio::spawn(worker.run()));
        session.cancel = Some(cancel);
    }

    /// Stop polling and cancel any pending tick. Idempotent; resets the
    /// session so a later `start()` begins fresh.
    pub fn stop(&self) {
        let mut session = self.session.lock().expect("poll session poisoned");
        if let Some(cancel) = session.cancel.take() {
            cancel.cancel();
        }
        if let Some(handle) = session.handle.take() {
            handle.abort();
            info!(event = "sync.poll.stopped", task_id = %session.task_id);
        }
    }

    /// Bind the controller to a different task.
    ///
    /// The old session's timer is stopped before the new identity is
    /// installed, so two sessions can never race on one controller.
    pub fn rebind(&self, task_id: impl Into<String>) {
        self.stop();
        let mut session = self.session.lock().expect("poll session poisoned");
        session.task_id = task_id.into();
    }

    /// Whether a poll session is currently live.
    pub fn is_polling(&self) -> bool {
        self.session
            .lock()
            .expect("poll session poisoned")
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub fn task_id(&self) -> String {
        self.session
            .lock()
            .expect("poll session poisoned")
            .task_id
            .clone()
    }
}

impl Drop for PollController {
    fn drop(&mut self) {
        self.stop();
    }
}

enum Settled {
    Terminal,
    RetriesExhausted,
    Hidden,
    Cancelled,
}

struct SessionWorker {
    task_id: String,
    fetcher: Arc<dyn StatusFetch>,
    config: PollConfig,
    bus: Option<EventBus>,
    coalescer: Option<RefreshCoalescer>,
    visibility: Option<watch::Receiver<bool>>,
    cancel: CancellationToken,
}

impl SessionWorker {
    async fn run(mut self) {
        loop {
            if !self.wait_until_visible().await {
                return;
            }
            match self.poll_until_settled().await {
                Settled::Hidden => {
                    // Force-stopped by visibility loss; does not count
                    // against retries. Regain restarts from a fresh tick.
                    info!(event = "sync.poll.suspended_hidden", task_id = %self.task_id);
                    continue;
                }
                Settled::Terminal | Settled::RetriesExhausted | Settled::Cancelled => return,
            }
        }
    }

    /// Block until the surface is visible. Returns `false` on cancellation.
    /// A dropped gate counts as visible.
    async fn wait_until_visible(&mut self) -> bool {
        let cancel = self.cancel.clone();
        let Some(rx) = self.visibility.as_mut() else {
            return true;
        };
        loop {
            if *rx.borrow() {
                return true;
            }
            tokio::select! {
                _ = cancel.cancelled() => return false,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return true;
                    }
                }
            }
        }
    }

    async fn poll_until_settled(&mut self) -> Settled {
        let cancel = self.cancel.clone();
        let interval = self.config.check_interval;
        let mut retry_count: u32 = 0;

        loop {
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return Settled::Cancelled,
                result = self.fetcher.fetch_task(&self.task_id, true) => result,
            };

            match fetched {
                Ok(task) => {
                    retry_count = 0;
                    self.publish_observation(&task);
                    if !task.status.is_active() {
                        info!(
                            event = "sync.poll.settled",
                            task_id = %self.task_id,
                            status = %task.status,
                        );
                        return Settled::Terminal;
                    }
                }
                Err(error) => {
                    retry_count += 1;
                    if retry_count > self.config.max_retries {
                        // Silent give-up: polling is best-effort, the log
                        // line is the only trace.
                        warn!(
                            event = "sync.poll.retries_exhausted",
                            task_id = %self.task_id,
                            attempts = retry_count,
                            error = %error,
                        );
                        return Settled::RetriesExhausted;
                    }
                    warn!(
                        event = "sync.poll.tick_failed",
                        task_id = %self.task_id,
                        retry_count = retry_count,
                        error = %error,
                    );
                }
            }

            // Arm the next tick only after the fetch settled — ticks within
            // a session never overlap.
            tokio::select! {
                _ = cancel.cancelled() => return Settled::Cancelled,
                _ = wait_hidden(&mut self.visibility) => return Settled::Hidden,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    fn publish_observation(&self, task: &Task) {
        if let Some(bus) = &self.bus {
            bus.publish(SyncEvent::TaskStatusChanged {
                task_id: self.task_id.clone(),
                status: task.status,
                result_url: task.result_url.clone(),
                error_message: task.error_message.clone(),
                observed_at: chrono::Utc::now().to_rfc3339(),
            });
        }
        if let Some(coalescer) = &self.coalescer {
            coalescer.request_refresh(Some(&self.task_id), RefreshParams::default());
        }
    }
}

/// Resolve when the gate reports hidden; never resolves without a gate or
/// after the gate is dropped.
async fn wait_hidden(visibility: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = visibility.as_mut() else {
        return std::future::pending().await;
    };
    loop {
        if !*rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            return std::future::pending().await;
        }
    }
}
