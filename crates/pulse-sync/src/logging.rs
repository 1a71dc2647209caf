use tracing_subscriber::EnvFilter;

/// Initialize JSON logging to stderr.
///
/// `quiet` suppresses all log output (the CLI default); verbose runs get
/// structured JSON lines filtered by `RUST_LOG` (default `info`). Safe to
/// call more than once — later calls are no-ops.
pub fn init_logging(quiet: bool) {
    if quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
