use owo_colors::OwoColorize;
use pulse_sync::TaskStatus;

/// Colored status label, padded to `width` BEFORE painting so ANSI escape
/// codes don't break column alignment.
pub fn status_label(status: TaskStatus, width: usize) -> String {
    let padded = format!("{:<width$}", status.as_str());
    match status {
        TaskStatus::Completed => padded.green().to_string(),
        TaskStatus::Failed | TaskStatus::Cancelled => padded.red().to_string(),
        TaskStatus::Pending | TaskStatus::Running => padded.yellow().to_string(),
        _ => padded.dimmed().to_string(),
    }
}
