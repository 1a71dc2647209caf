use std::sync::Arc;
use std::time::Duration;

use clap::ArgMatches;
use owo_colors::OwoColorize;
use pulse_sync::poll::{PollConfig, PollController};
use pulse_sync::{ApiClient, EventBus, SyncConfig, SyncEvent, TaskStatus};
use tracing::info;

use super::CliError;
use crate::color::status_label;

pub async fn handle_watch(matches: &ArgMatches, config: &SyncConfig) -> Result<(), CliError> {
    let task_id = matches.get_one::<String>("task-id").expect("required arg");

    let mut poll_config = PollConfig::from(config);
    if let Some(interval) = matches.get_one::<u64>("interval-ms") {
        poll_config.check_interval = Duration::from_millis(*interval);
    }
    let check_interval = poll_config.check_interval;

    info!(event = "cli.watch.started", task_id = %task_id);

    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let client = Arc::new(ApiClient::new(&config.base_url));
    let poller = PollController::new(task_id.clone(), client, poll_config).with_bus(bus);

    println!("watching task {}", task_id.bold());
    poller.start();

    let mut last_status: Option<TaskStatus> = None;
    loop {
        // Polling gives up silently after its retry budget; the generous
        // timeout is how we notice that and stop waiting for events.
        match tokio::time::timeout(check_interval * 4, rx.recv()).await {
            Ok(Ok(SyncEvent::TaskStatusChanged {
                status,
                result_url,
                error_message,
                ..
            })) => {
                if last_status != Some(status) {
                    println!("  {}", status_label(status, 0));
                    last_status = Some(status);
                }
                if !status.is_active() {
                    return match status {
                        TaskStatus::Completed => {
                            if let Some(url) = result_url {
                                println!("result: {}", url);
                            }
                            Ok(())
                        }
                        other => {
                            let reason = error_message
                                .unwrap_or_else(|| "no error message".to_string());
                            eprintln!("task {} ended {}: {}", task_id, other, reason);
                            Err(CliError::TaskNotCompleted {
                                task_id: task_id.clone(),
                                status: other.to_string(),
                            })
                        }
                    };
                }
            }
            Ok(Ok(_)) => {}
            Ok(Err(_)) => {}
            Err(_elapsed) => {
                if !poller.is_polling() {
                    eprintln!("gave up polling task {} (backend unreachable?)", task_id);
                    return Err(CliError::GaveUp(task_id.clone()));
                }
            }
        }
    }
}
