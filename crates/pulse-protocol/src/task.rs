use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Task status as reported by the backend.
///
/// The backend is not consistent about casing (`"RUNNING"` vs `"running"`),
/// so all parsing goes through [`TaskStatus::parse`], which normalizes to
/// lowercase first. Unrecognized values map to `Unknown` instead of failing
/// the surrounding task record.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    #[default]
    Unknown,
}

impl TaskStatus {
    /// Parse a raw status string case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => TaskStatus::Pending,
            "running" => TaskStatus::Running,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            "cancelled" => TaskStatus::Cancelled,
            _ => TaskStatus::Unknown,
        }
    }

    /// Whether this status keeps a poll session alive.
    ///
    /// Anything outside the active set ends polling, including `Unknown` —
    /// an unrecognized status from a newer backend must not poll forever.
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    /// Whether this is a known terminal status (completed, failed, cancelled).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TaskStatus::parse(&raw))
    }
}

/// A server-tracked unit of image-processing work.
///
/// Owned by the backend; the client holds a read-only, eventually consistent
/// copy. Output references (`images`, `result_url`) are populated only in
/// terminal states. All non-identifying fields default on deserialization so
/// a sparse or partially malformed record still produces a usable `Task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Task {
    /// Minimal task with just an id and status. Everything else defaults.
    pub fn new(task_id: impl Into<String>, status: TaskStatus) -> Self {
        Task {
            task_id: task_id.into(),
            status,
            action: None,
            images: Vec::new(),
            result_url: None,
            thumbnail_url: None,
            progress: None,
            error_message: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Best-available output reference: the full result if present, then the
    /// first generated image, then the thumbnail.
    pub fn best_image_url(&self) -> Option<&str> {
        self.result_url
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
            .or(self.thumbnail_url.as_deref())
    }
}

/// Query parameters for a task-list fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskQuery {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl TaskQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        TaskQuery {
            user_id: user_id.into(),
            action: None,
            page: 1,
            size: 20,
        }
    }
}

/// One page of a task-list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPage {
    #[serde(default)]
    pub records: Vec<Task>,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(TaskStatus::parse("RUNNING"), TaskStatus::Running);
        assert_eq!(TaskStatus::parse("Pending"), TaskStatus::Pending);
        assert_eq!(TaskStatus::parse("completed"), TaskStatus::Completed);
        assert_eq!(TaskStatus::parse(" failed "), TaskStatus::Failed);
        assert_eq!(TaskStatus::parse("CANCELLED"), TaskStatus::Cancelled);
        assert_eq!(TaskStatus::parse("archived"), TaskStatus::Unknown);
        assert_eq!(TaskStatus::parse(""), TaskStatus::Unknown);
    }

    #[test]
    fn test_status_active_set() {
        assert!(TaskStatus::Pending.is_active());
        assert!(TaskStatus::Running.is_active());
        assert!(!TaskStatus::Completed.is_active());
        assert!(!TaskStatus::Failed.is_active());
        assert!(!TaskStatus::Cancelled.is_active());
        // Unknown ends polling even though it is not a known terminal state.
        assert!(!TaskStatus::Unknown.is_active());
        assert!(!TaskStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Running).unwrap(),
            r#""running""#
        );
        let parsed: TaskStatus = serde_json::from_str(r#""COMPLETED""#).unwrap();
        assert_eq!(parsed, TaskStatus::Completed);
    }

    #[test]
    fn test_task_deserialize_sparse_record() {
        let task: Task = serde_json::from_str(r#"{"task_id":"abc123"}"#).unwrap();
        assert_eq!(task.task_id, "abc123");
        assert_eq!(task.status, TaskStatus::Unknown);
        assert!(task.images.is_empty());
        assert_eq!(task.best_image_url(), None);
    }

    #[test]
    fn test_task_serde_roundtrip() {
        let task = Task {
            task_id: "t-1".to_string(),
            status: TaskStatus::Completed,
            action: Some("upscale".to_string()),
            images: vec!["https://x/a.png".to_string()],
            result_url: Some("https://x/y.png".to_string()),
            thumbnail_url: None,
            progress: Some(100.0),
            error_message: None,
            created_at: Some("2026-08-01T10:00:00Z".to_string()),
            updated_at: Some("2026-08-01T10:00:05Z".to_string()),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains(r#""status":"completed""#));
        assert!(!json.contains("thumbnail_url"));
        assert!(!json.contains("error_message"));
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn test_best_image_url_preference_order() {
        let mut task = Task::new("t-1", TaskStatus::Completed);
        assert_eq!(task.best_image_url(), None);

        task.thumbnail_url = Some("https://x/thumb.png".to_string());
        assert_eq!(task.best_image_url(), Some("https://x/thumb.png"));

        task.images = vec!["https://x/img0.png".to_string()];
        assert_eq!(task.best_image_url(), Some("https://x/img0.png"));

        task.result_url = Some("https://x/full.png".to_string());
        assert_eq!(task.best_image_url(), Some("https://x/full.png"));
    }

    #[test]
    fn test_task_page_defaults() {
        let page: TaskPage = serde_json::from_str("{}").unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total, 0);
    }
}
