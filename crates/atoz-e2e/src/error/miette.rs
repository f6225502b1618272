//! Conversion of CLI errors into miette reports.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Converts a [`CliError`] into a report for the binary boundary.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(ConfigError::InvalidValue { field, value, hint }) => {
            miette::miette!("Invalid configuration value for '{field}': {value}\n\nHint: {hint}")
        }
        CliError::Config(e) => miette::miette!("Configuration error: {e}"),
        CliError::Browser(e) if e.is_timeout() => {
            miette::miette!("Browser error: {e}\n\nHint: raise --step-timeout-ms or check that the site responds")
        }
        CliError::Browser(e) => miette::miette!("Browser error: {e}"),
        _ => miette::miette!("{err}"),
    }
}
