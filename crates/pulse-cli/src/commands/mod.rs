mod list;
mod stream;
mod watch;

use clap::ArgMatches;
use pulse_sync::http::ApiError;
use pulse_sync::{SyncConfig, SyncError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("task {task_id} ended {status}")]
    TaskNotCompleted { task_id: String, status: String },

    #[error("polling gave up on task {0}")]
    GaveUp(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

pub async fn run_command(matches: &ArgMatches) -> Result<(), CliError> {
    let config = load_config(matches)?;
    match matches.subcommand() {
        Some(("watch", sub)) => watch::handle_watch(sub, &config).await,
        Some(("stream", sub)) => stream::handle_stream(sub, &config).await,
        Some(("list", sub)) => list::handle_list(sub, &config).await,
        _ => unreachable!("subcommand required by clap"),
    }
}

fn load_config(matches: &ArgMatches) -> Result<SyncConfig, CliError> {
    let mut config = match SyncConfig::load(&SyncConfig::default_path()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid config: {}", e);
            return Err(e.into());
        }
    };
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }
    if let Err(e) = config.validate() {
        eprintln!("invalid config: {}", e);
        return Err(e.into());
    }
    Ok(config)
}
