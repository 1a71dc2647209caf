use serde::{Deserialize, Serialize};

/// Parameters carried by a coalesced task-list refresh broadcast.
///
/// Requests pushed within one debounce window collapse to the most recently
/// pushed parameter set — last-write-wins, not an additive merge. Receivers
/// layer these onto their own current filter/pagination state; `task_id` is
/// a hint, not a guarantee (an earlier call's id may be dropped by a later,
/// unrelated call).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub page: u32,
    pub size: u32,
    pub force_refresh: bool,
    pub use_stored_params: bool,
}

impl Default for RefreshParams {
    fn default() -> Self {
        RefreshParams {
            task_id: None,
            user_id: None,
            action: None,
            page: 1,
            size: 20,
            force_refresh: false,
            use_stored_params: true,
        }
    }
}

impl RefreshParams {
    /// Build the parameter set for one refresh request: the caller's base
    /// params with `force_refresh` asserted, stored-params lookup disabled,
    /// and the task id layered in (the caller's explicit id wins over
    /// whatever the base carried).
    pub fn for_request(task_id: Option<&str>, base: RefreshParams) -> Self {
        RefreshParams {
            task_id: task_id.map(str::to_string).or(base.task_id),
            force_refresh: true,
            use_stored_params: false,
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = RefreshParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.size, 20);
        assert!(!params.force_refresh);
        assert!(params.use_stored_params);
        assert!(params.task_id.is_none());
    }

    #[test]
    fn test_for_request_forces_flags() {
        let params = RefreshParams::for_request(Some("abc123"), RefreshParams::default());
        assert!(params.force_refresh);
        assert!(!params.use_stored_params);
        assert_eq!(params.task_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_for_request_explicit_id_wins() {
        let base = RefreshParams {
            task_id: Some("old".to_string()),
            ..Default::default()
        };
        let params = RefreshParams::for_request(Some("new"), base.clone());
        assert_eq!(params.task_id.as_deref(), Some("new"));

        let kept = RefreshParams::for_request(None, base);
        assert_eq!(kept.task_id.as_deref(), Some("old"));
    }

    #[test]
    fn test_serde_omits_empty_optionals() {
        let json = serde_json::to_string(&RefreshParams::default()).unwrap();
        assert!(!json.contains("task_id"));
        assert!(!json.contains("user_id"));
        assert!(!json.contains("action"));
    }
}
