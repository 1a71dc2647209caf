use std::collections::HashMap;

use pulse_protocol::Task;

/// Whether two task-list snapshots differ in any observable way.
///
/// Observable means what a list rendering actually shows: normalized
/// status, best-available image URL, progress, and error message. Ordering
/// changes with identical content count as changed (lists render in order);
/// a task present in `new` but absent from `old` counts as changed.
/// Malformed entries degrade gracefully — optional fields compare as
/// absent, nothing panics.
pub fn has_changed(old: &[Task], new: &[Task]) -> bool {
    if old.len() != new.len() {
        return true;
    }

    let by_id: HashMap<&str, &Task> = old.iter().map(|t| (t.task_id.as_str(), t)).collect();

    // Same length + same ids in the same order implies no ordering change.
    let order_changed = old
        .iter()
        .zip(new.iter())
        .any(|(o, n)| o.task_id != n.task_id);
    if order_changed {
        return true;
    }

    new.iter().any(|task| match by_id.get(task.task_id.as_str()) {
        None => true,
        Some(prev) => observably_differs(prev, task),
    })
}

fn observably_differs(old: &Task, new: &Task) -> bool {
    old.status != new.status
        || old.best_image_url() != new.best_image_url()
        || old.progress != new.progress
        || old.error_message != new.error_message
}

/// Result of reconciling a fresh snapshot against the rendered one.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// Nothing observable changed; keep the previous allocation and skip
    /// the update entirely.
    Unchanged,
    /// Something changed; replace the rendered list with this one.
    Updated(Vec<Task>),
}

impl Reconciled {
    pub fn changed(&self) -> bool {
        matches!(self, Reconciled::Updated(_))
    }
}

/// Reconcile a freshly fetched list against the currently rendered one.
pub fn reconcile(old: &[Task], new: Vec<Task>) -> Reconciled {
    if has_changed(old, &new) {
        Reconciled::Updated(new)
    } else {
        Reconciled::Unchanged
    }
}

/// Reference-stable task list storage.
///
/// Applies [`reconcile`] so callers get a plain "did anything change" bool
/// and the stored vector is left untouched on identical refreshes.
#[derive(Debug, Default)]
pub struct TaskListState {
    tasks: Vec<Task>,
}

impl TaskListState {
    pub fn new() -> Self {
        TaskListState { tasks: Vec::new() }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Install a fresh snapshot if it observably differs. Returns whether
    /// the stored list was replaced.
    pub fn apply(&mut self, new: Vec<Task>) -> bool {
        match reconcile(&self.tasks, new) {
            Reconciled::Unchanged => false,
            Reconciled::Updated(tasks) => {
                self.tasks = tasks;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_protocol::TaskStatus;

    fn sample() -> Vec<Task> {
        vec![
            Task::new("t-1", TaskStatus::Running),
            Task::new("t-2", TaskStatus::Pending),
            Task {
                result_url: Some("https://x/done.png".to_string()),
                ..Task::new("t-3", TaskStatus::Completed)
            },
        ]
    }

    #[test]
    fn test_identical_lists_have_not_changed() {
        let list = sample();
        assert!(!has_changed(&list, &list.clone()));
        assert!(!has_changed(&[], &[]));
    }

    #[test]
    fn test_status_change_detected() {
        let old = sample();
        let mut new = sample();
        new[0].status = TaskStatus::Completed;
        assert!(has_changed(&old, &new));
    }

    #[test]
    fn test_image_url_change_detected() {
        let old = sample();
        let mut new = sample();
        new[2].result_url = Some("https://x/redone.png".to_string());
        assert!(has_changed(&old, &new));
    }

    #[test]
    fn test_progress_and_error_changes_detected() {
        let old = sample();

        let mut new = sample();
        new[1].progress = Some(40.0);
        assert!(has_changed(&old, &new));

        let mut new = sample();
        new[0].error_message = Some("GPU quota exceeded".to_string());
        assert!(has_changed(&old, &new));
    }

    #[test]
    fn test_length_difference_detected() {
        let old = sample();
        let mut new = sample();
        new.pop();
        assert!(has_changed(&old, &new));
        assert!(has_changed(&new, &old));
    }

    #[test]
    fn test_replaced_task_detected() {
        let old = sample();
        let mut new = sample();
        new[1] = Task::new("t-9", TaskStatus::Pending);
        assert!(has_changed(&old, &new));
    }

    #[test]
    fn test_reorder_detected() {
        let old = sample();
        let mut new = sample();
        new.swap(0, 1);
        assert!(has_changed(&old, &new));
    }

    #[test]
    fn test_ignored_fields_do_not_trigger_change() {
        let old = sample();
        let mut new = sample();
        // Timestamps and action are not rendered by list views.
        new[0].updated_at = Some("2026-08-01T11:00:00Z".to_string());
        new[1].action = Some("upscale".to_string());
        assert!(!has_changed(&old, &new));
    }

    #[test]
    fn test_state_keeps_allocation_when_unchanged() {
        let mut state = TaskListState::new();
        assert!(state.apply(sample()));

        let before = state.tasks().as_ptr();
        assert!(!state.apply(sample()));
        assert_eq!(state.tasks().as_ptr(), before, "unchanged apply must not reallocate");

        let mut bumped = sample();
        bumped[0].status = TaskStatus::Completed;
        assert!(state.apply(bumped));
        assert_eq!(state.tasks()[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_reconcile_unchanged_drops_new_snapshot() {
        let old = sample();
        assert_eq!(reconcile(&old, sample()), Reconciled::Unchanged);
        assert!(reconcile(&old, Vec::new()).changed());
    }
}
