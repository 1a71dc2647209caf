use async_trait::async_trait;
use pulse_protocol::Task;

use crate::errors::SyncError;

/// Task-detail fetch seam used by the poll controller.
///
/// Implemented by [`crate::ApiClient`] for production; tests inject scripted
/// implementations. `is_polling` marks timer-driven fetches so the backend
/// can apply lighter-weight semantics than a user-initiated load.
#[async_trait]
pub trait StatusFetch: Send + Sync + 'static {
    async fn fetch_task(&self, task_id: &str, is_polling: bool) -> Result<Task, SyncError>;
}
