//! atoz-e2e - navigation end-to-end tests for the CNCF Landscape A-to-Z site.
//!
//! Parses arguments, initializes logging and dispatches to a command.

use atoz_e2e::{cli, commands, error, logger};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    let color = !args.no_color && logger::should_use_colors();

    let result = match args.command {
        cli::Command::Run(run_args) => commands::run_execute(run_args, color).await,
        cli::Command::List(list_args) => commands::list_execute(&list_args, color),
    };

    result.map_err(error::cli_error_to_miette)
}
