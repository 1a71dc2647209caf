use std::sync::Arc;

use clap::ArgMatches;
use owo_colors::OwoColorize;
use pulse_sync::stream::{StreamAdapter, StreamConfig};
use pulse_sync::{EventBus, SyncConfig, SyncEvent, WsTransport};
use tracing::info;

use super::CliError;
use crate::color::status_label;

pub async fn handle_stream(_matches: &ArgMatches, config: &SyncConfig) -> Result<(), CliError> {
    let url = config.stream_url();
    info!(event = "cli.stream.started", url = %url);

    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let adapter = StreamAdapter::new(
        Arc::new(WsTransport::new(url.clone())),
        bus,
        StreamConfig::from(config),
    );

    println!("streaming from {} (ctrl-c to stop)", url.bold());
    adapter.start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Ok(SyncEvent::TaskStatusChanged { task_id, status, .. }) => {
                    println!("task {} -> {}", task_id.bold(), status_label(status, 0));
                }
                Ok(SyncEvent::WalletPointsChanged { user_id, points }) => {
                    match user_id {
                        Some(user_id) => println!("points for {} -> {}", user_id.bold(), points),
                        None => println!("points -> {}", points),
                    }
                }
                Ok(SyncEvent::RefreshRequested(_)) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    eprintln!("(skipped {} events)", skipped);
                }
                Err(_) => break,
            }
        }
    }

    adapter.shutdown();
    Ok(())
}
