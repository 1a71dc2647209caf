use pulse_sync::init_logging;

mod app;
mod color;
mod commands;

#[tokio::main]
async fn main() {
    let app = app::build_cli();
    let matches = app.get_matches();

    let verbose = matches.get_flag("verbose");
    init_logging(!verbose);

    if let Err(e) = commands::run_command(&matches).await {
        // User-facing message was already printed via eprintln! in the
        // command handlers; exit non-zero without the Debug representation.
        drop(e);
        std::process::exit(1);
    }
}
