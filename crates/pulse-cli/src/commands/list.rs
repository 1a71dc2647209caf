use clap::ArgMatches;
use pulse_sync::{ApiClient, SyncConfig, TaskQuery};
use tracing::info;

use super::CliError;
use crate::color::status_label;

pub async fn handle_list(matches: &ArgMatches, config: &SyncConfig) -> Result<(), CliError> {
    let user = matches.get_one::<String>("user").expect("required arg");
    let mut query = TaskQuery::for_user(user.clone());
    query.action = matches.get_one::<String>("action").cloned();
    if let Some(page) = matches.get_one::<u32>("page") {
        query.page = *page;
    }
    if let Some(size) = matches.get_one::<u32>("size") {
        query.size = *size;
    }

    info!(event = "cli.list.started", user_id = %query.user_id, page = query.page);

    let client = ApiClient::new(&config.base_url);
    let page = match client.list_tasks(&query).await {
        Ok(page) => page,
        Err(e) => {
            eprintln!("failed to list tasks: {}", e);
            return Err(e.into());
        }
    };

    if page.records.is_empty() {
        println!("no tasks for user {} (page {})", user, query.page);
        return Ok(());
    }

    println!("{:<24} {:<12} {:<10} RESULT", "TASK", "STATUS", "ACTION");
    for task in &page.records {
        println!(
            "{:<24} {} {:<10} {}",
            task.task_id,
            status_label(task.status, 12),
            task.action.as_deref().unwrap_or("-"),
            task.best_image_url().unwrap_or("-"),
        );
    }
    println!("\n{} of {} task(s)", page.records.len(), page.total);
    Ok(())
}
