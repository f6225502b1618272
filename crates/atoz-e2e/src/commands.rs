//! Subcommand implementations.

use crate::cli::{ListArgs, RunArgs};
use crate::config::RunConfig;
use crate::error::{CliError, Result};
use crate::scenario::{Scenario, Selection};
use crate::scenarios::{catalogue, CatalogueOptions};
use crate::runner::Runner;
use atoz_browser::HttpSite;
use owo_colors::OwoColorize;
use tracing::info;

/// `atoz-e2e run`
///
/// Prints the report to stdout, then fails with `ScenariosFailed` when any
/// scenario failed so the process exits non-zero.
///
/// # Errors
///
/// Configuration, health check and browser launch failures, an empty
/// selection, report writing failures and failed scenarios.
pub async fn run_execute(args: RunArgs, color: bool) -> Result<()> {
    let config = RunConfig::load(&args.overrides(), args.config.as_deref())?;
    let scenarios = selected(&config.selection(), &config.catalogue_options())?;

    info!(
        base_url = %config.base_url,
        scenarios = scenarios.len(),
        "starting run"
    );

    let runner = Runner::new(
        HttpSite::new(config.base_url.clone()),
        config.browser_config(),
        config.runner_options(),
    );
    let report = runner.run(&scenarios).await?;

    print!("{}", report.render(color));

    if let Some(path) = &config.json_report {
        report.write_json(path)?;
        info!(path = %path.display(), "wrote JSON report");
    }

    if report.success() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed,
            total: report.total,
        })
    }
}

/// `atoz-e2e list`
///
/// # Errors
///
/// `NothingSelected` when the selection is empty.
pub fn list_execute(args: &ListArgs, color: bool) -> Result<()> {
    let selection = Selection {
        suites: args.select.suites.clone(),
        filter: args.select.filter.clone(),
    };
    let scenarios = selected(&selection, &CatalogueOptions::default())?;

    for scenario in &scenarios {
        if color {
            println!("{} › {}", scenario.suite.dimmed(), scenario.name);
        } else {
            println!("{}", scenario.id());
        }
    }
    println!("\n{} scenario(s)", scenarios.len());
    Ok(())
}

fn selected(selection: &Selection, options: &CatalogueOptions) -> Result<Vec<Scenario>> {
    let scenarios = selection.apply(catalogue(options));
    if scenarios.is_empty() {
        return Err(CliError::NothingSelected);
    }
    Ok(scenarios)
}
