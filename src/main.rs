//! devplan CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use devplan::cli::{exit_code_for, Cli, CommandDispatcher};
use devplan::ui::{DevplanTheme, Output, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
///
/// Logs go to stderr so `--json` output on stdout stays clean.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("devplan=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devplan=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("devplan starting with args: {:?}", cli);

    let output = Output::new(
        OutputMode::from_flags(cli.verbose, cli.quiet),
        cli.json,
        DevplanTheme::for_terminal(cli.no_color),
    );

    let start_dir = cli
        .project
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let dispatcher = CommandDispatcher::new(&start_dir, cli.config.clone());

    match dispatcher.dispatch(&cli, &output) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            output.error(&format!("Error: {}", e));
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}
