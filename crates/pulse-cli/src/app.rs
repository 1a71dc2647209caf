use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("pulse")
        .about("Task status synchronization client for the Pulse image service")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Emit JSON logs to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Backend base URL (overrides config)")
                .global(true),
        )
        .subcommand(
            Command::new("watch")
                .about("Poll one task until it reaches a terminal state")
                .arg(
                    Arg::new("task-id")
                        .value_name("TASK_ID")
                        .required(true)
                        .help("Task to watch"),
                )
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .value_name("MS")
                        .value_parser(clap::value_parser!(u64))
                        .help("Delay between poll ticks"),
                ),
        )
        .subcommand(Command::new("stream").about("Tail the push-notification stream"))
        .subcommand(
            Command::new("list")
                .about("List tasks for a user")
                .arg(
                    Arg::new("user")
                        .long("user")
                        .value_name("USER_ID")
                        .required(true)
                        .help("User whose tasks to list"),
                )
                .arg(
                    Arg::new("action")
                        .long("action")
                        .value_name("ACTION")
                        .help("Filter by capability (upscale, tile, ...)"),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_name("N")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("size")
                        .long("size")
                        .value_name("N")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("20"),
                ),
        )
}
