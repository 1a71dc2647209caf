//! pulse-sync: client-side task status synchronization
//!
//! Keeps locally displayed task state eventually consistent with the backend
//! under multiple competing triggers (manual actions, timers, visibility
//! changes, push events) without duplicate or runaway network requests.
//!
//! # Main Entry Points
//!
//! - [`PollController`] - poll one task until it settles
//! - [`RefreshCoalescer`] - collapse refresh triggers into one broadcast
//! - [`StreamAdapter`] - reconnecting push channel
//! - [`TaskListState`] - snapshot differ for task lists
//! - [`EventBus`] - typed event vocabulary shared by polling and push

pub mod bus;
pub mod config;
pub mod debounce;
pub mod errors;
pub mod fetch;
#[cfg(feature = "http")]
pub mod http;
pub mod listsync;
pub mod logging;
pub mod poll;
pub mod refresh;
pub mod stream;
pub mod visibility;

pub use bus::{EventBus, SyncEvent};
pub use config::SyncConfig;
pub use debounce::DebounceRegistry;
pub use errors::SyncError;
pub use fetch::StatusFetch;
#[cfg(feature = "http")]
pub use http::{ApiClient, ApiError};
pub use listsync::{Reconciled, TaskListState, has_changed, reconcile};
pub use logging::init_logging;
pub use poll::{PollConfig, PollController};
pub use refresh::{REFRESH_KEY, RefreshCoalescer};
pub use stream::{StreamAdapter, StreamConfig, StreamConnection, StreamTransport};
#[cfg(feature = "ws")]
pub use stream::ws::WsTransport;
pub use visibility::VisibilityGate;

// Re-export the wire types callers handle at every seam.
pub use pulse_protocol::{RefreshParams, Task, TaskPage, TaskQuery, TaskStatus};
