use std::process::ExitCode;

use clap::Parser;
use ytfetch_core::logging;

mod cli;

use crate::cli::{Cli, Route};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let route = cli.route();
    if matches!(route, Route::Help) {
        return cli::print_help();
    }

    // Fall back to stderr-only logging if the state dir is unwritable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    match cli::dispatch(cli, route).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("Fatal error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
