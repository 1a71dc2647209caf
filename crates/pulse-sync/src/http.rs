//! REST client for the task endpoints.

use async_trait::async_trait;
use pulse_protocol::{Task, TaskPage, TaskQuery};
use tracing::debug;

use crate::errors::SyncError;
use crate::fetch::StatusFetch;

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),
}

/// Typed client for the backend task API.
///
/// Unauthenticated by design; this layer does not own credentials.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one task's current snapshot.
    ///
    /// `is_polling` is forwarded so the backend can serve timer-driven
    /// fetches from a lighter path than user-initiated loads.
    pub async fn fetch_task(&self, task_id: &str, is_polling: bool) -> Result<Task, ApiError> {
        let url = format!("{}/api/tasks/{}", self.base_url, task_id);
        debug!(event = "sync.api.fetch_task", task_id = task_id, is_polling = is_polling);

        let response = self
            .http
            .get(&url)
            .query(&[("is_polling", is_polling)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        response
            .json::<Task>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetch one page of a user's task list.
    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskPage, ApiError> {
        let url = format!("{}/api/tasks", self.base_url);
        debug!(
            event = "sync.api.list_tasks",
            user_id = %query.user_id,
            page = query.page,
            size = query.size,
        );

        let mut request = self.http.get(&url).query(&[
            ("user_id", query.user_id.as_str()),
        ]);
        if let Some(action) = &query.action {
            request = request.query(&[("action", action.as_str())]);
        }
        request = request.query(&[("page", query.page), ("size", query.size)]);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        response
            .json::<TaskPage>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn truncate(s: &str, max: usize) -> String {
    let mut out: String = s.chars().take(max).collect();
    if s.chars().count() > max {
        out.push('…');
    }
    out
}

#[async_trait]
impl StatusFetch for ApiClient {
    async fn fetch_task(&self, task_id: &str, is_polling: bool) -> Result<Task, SyncError> {
        ApiClient::fetch_task(self, task_id, is_polling)
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Server {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn test_truncate_long_bodies() {
        let long = "x".repeat(500);
        let out = truncate(&long, 200);
        assert_eq!(out.chars().count(), 201);
        assert!(out.ends_with('…'));
        assert_eq!(truncate("short", 200), "short");
    }
}
