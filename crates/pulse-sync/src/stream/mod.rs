//! Reconnecting push-notification channel.
//!
//! Push is an optimization/redundancy layer over polling, not a
//! replacement: inbound frames translate into the same [`SyncEvent`]
//! vocabulary the poll controller publishes, so downstream consumers cannot
//! tell which path delivered an update.

#[cfg(feature = "ws")]
pub mod ws;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pulse_protocol::{StreamEvent, StreamFrame};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::{EventBus, SyncEvent};
use crate::config::SyncConfig;
use crate::errors::SyncError;

/// Reconnect timing for the push channel.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30000),
        }
    }
}

impl From<&SyncConfig> for StreamConfig {
    fn from(config: &SyncConfig) -> Self {
        StreamConfig {
            base_delay: config.reconnect_base_delay(),
            max_delay: config.reconnect_max_delay(),
        }
    }
}

/// Delay before reconnect attempt number `attempt` (0-based):
/// `min(max_delay, base_delay * 2^attempt)`.
pub fn reconnect_delay(attempt: u32, config: &StreamConfig) -> Duration {
    // Shift capped far above any real cap; avoids overflow for large attempts.
    let factor = 1u32 << attempt.min(16);
    config.base_delay.saturating_mul(factor).min(config.max_delay)
}

/// Connection factory seam; production uses [`ws::WsTransport`], tests
/// inject scripted transports.
#[async_trait]
pub trait StreamTransport: Send + Sync + 'static {
    async fn connect(&self) -> Result<Box<dyn StreamConnection>, SyncError>;
}

/// One live connection delivering text frames.
///
/// `None` means the peer closed cleanly; `Some(Err)` is a transport error.
/// Either way the adapter drops the connection and reconnects.
#[async_trait]
pub trait StreamConnection: Send {
    async fn next_frame(&mut self) -> Option<Result<String, SyncError>>;
}

/// Reconnecting push-channel adapter.
///
/// `Connecting -> Open -> Closed -> (backoff) -> Connecting`, with the
/// backoff attempt counter reset on every successful open. At most one live
/// connection exists per adapter; the previous connection is dropped before
/// a new connect starts. After [`shutdown`](Self::shutdown) no further
/// reconnect is ever scheduled — the cancellation token is checked before
/// every backoff sleep, so a late close event cannot resurrect the channel.
pub struct StreamAdapter {
    transport: Arc<dyn StreamTransport>,
    bus: EventBus,
    config: StreamConfig,
    runner: Mutex<Runner>,
}

struct Runner {
    cancel: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl StreamAdapter {
    pub fn new(transport: Arc<dyn StreamTransport>, bus: EventBus, config: StreamConfig) -> Self {
        StreamAdapter {
            transport,
            bus,
            config,
            runner: Mutex::new(Runner {
                cancel: None,
                handle: None,
            }),
        }
    }

    /// Start the channel. No-op while already running.
    pub fn start(&self) {
        let mut runner = self.runner.lock().expect("stream runner poisoned");
        if runner.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!(event = "sync.stream.already_running");
            return;
        }

        let cancel = CancellationToken::new();
        let worker = ChannelWorker {
            transport: Arc::clone(&self.transport),
            bus: self.bus.clone(),
            config: self.config.clone(),
            cancel: cancel.clone(),
        };
        info!(event = "sync.stream.started");
        runner.handle = Some(tokio::spawn(worker.run()));
        runner.cancel = Some(cancel);
    }

    /// Tear the channel down: mark inactive, then drop the connection and
    /// any pending backoff timer. Idempotent.
    pub fn shutdown(&self) {
        let mut runner = self.runner.lock().expect("stream runner poisoned");
        if let Some(cancel) = runner.cancel.take() {
            cancel.cancel();
        }
        if let Some(handle) = runner.handle.take() {
            handle.abort();
            info!(event = "sync.stream.shutdown");
        }
    }

    pub fn is_running(&self) -> bool {
        self.runner
            .lock()
            .expect("stream runner poisoned")
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for StreamAdapter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct ChannelWorker {
    transport: Arc<dyn StreamTransport>,
    bus: EventBus,
    config: StreamConfig,
    cancel: CancellationToken,
}

impl ChannelWorker {
    async fn run(self) {
        let mut attempt: u32 = 0;
        loop {
            debug!(event = "sync.stream.connecting", attempt = attempt);
            let connected = tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = self.transport.connect() => result,
            };

            match connected {
                Ok(mut conn) => {
                    attempt = 0;
                    info!(event = "sync.stream.opened");
                    loop {
                        let frame = tokio::select! {
                            _ = self.cancel.cancelled() => return,
                            frame = conn.next_frame() => frame,
                        };
                        match frame {
                            Some(Ok(text)) => self.handle_frame(&text),
                            Some(Err(error)) => {
                                warn!(event = "sync.stream.read_failed", error = %error);
                                break;
                            }
                            None => {
                                info!(event = "sync.stream.closed");
                                break;
                            }
                        }
                    }
                    // conn drops here — never more than one live connection.
                }
                Err(error) => {
                    warn!(
                        event = "sync.stream.connect_failed",
                        error = %error,
                        attempt = attempt,
                    );
                }
            }

            let delay = reconnect_delay(attempt, &self.config);
            attempt += 1;
            debug!(
                event = "sync.stream.reconnect_scheduled",
                delay_ms = delay.as_millis() as u64,
                attempt = attempt,
            );
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Translate one inbound frame into the shared event vocabulary.
    /// Malformed or unknown frames are dropped with a warning — a single
    /// bad frame must never take the channel down.
    fn handle_frame(&self, text: &str) {
        let frame = match StreamFrame::parse(text) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(event = "sync.stream.frame_malformed", error = %error);
                return;
            }
        };
        match frame.classify() {
            Some(StreamEvent::TaskStatus(payload)) => {
                self.bus.publish(SyncEvent::TaskStatusChanged {
                    task_id: payload.task_id,
                    status: payload.status,
                    result_url: payload.result_url,
                    error_message: payload.error_message,
                    observed_at: chrono::Utc::now().to_rfc3339(),
                });
            }
            Some(StreamEvent::WalletPoints(payload)) => {
                self.bus.publish(SyncEvent::WalletPointsChanged {
                    user_id: payload.user_id,
                    points: payload.points,
                });
            }
            None => {
                warn!(event = "sync.stream.frame_dropped", kind = %frame.kind);
            }
        }
    }
}
