//! Command-line interface.
//!
//! - `atoz-e2e run` - run the scenario catalogue against a site
//! - `atoz-e2e list` - print the scenarios a run would include

use crate::config::ConfigOverrides;
use crate::scenario::Suite;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// atoz-e2e - navigation tests for the CNCF Landscape A-to-Z site
#[derive(Parser, Debug)]
#[command(
    name = "atoz-e2e",
    version,
    about = "Navigation end-to-end tests for the CNCF Landscape A-to-Z site",
    long_about = "Drives headless Chrome through the A-to-Z site and checks its links,\n\
                  pagination controls and page transitions across all three levels."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all log output except errors
    ///
    /// The final report is still printed.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run scenarios against a running site
    ///
    /// Exits non-zero when any scenario fails.
    Run(RunArgs),

    /// List scenarios without launching a browser
    List(ListArgs),
}

/// Which scenarios to include.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Only run this suite (repeatable)
    #[arg(short, long = "suite", value_enum, value_name = "SUITE")]
    pub suites: Vec<Suite>,

    /// Only run scenarios whose id contains this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Base URL of the site under test
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Scenarios to run at once
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Bound on each wait, in milliseconds
    #[arg(long, value_name = "MS")]
    pub step_timeout_ms: Option<u64>,

    /// Bound on each scenario, in milliseconds
    #[arg(long, value_name = "MS")]
    pub scenario_timeout_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chrome executable to launch
    #[arg(long = "chrome", value_name = "PATH")]
    pub chrome_path: Option<String>,

    /// Also write the report as JSON
    #[arg(long = "json", value_name = "PATH")]
    pub json_report: Option<PathBuf>,

    /// Directory for failure screenshots
    #[arg(long = "artifacts", value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Config file (default: ./atoz-e2e.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Flags that were actually given, as the top configuration layer.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            workers: self.workers,
            step_timeout_ms: self.step_timeout_ms,
            scenario_timeout_ms: self.scenario_timeout_ms,
            headless: self.headed.then_some(false),
            chrome_path: self.chrome_path.clone(),
            suites: (!self.select.suites.is_empty()).then(|| self.select.suites.clone()),
            filter: self.select.filter.clone(),
            json_report: self.json_report.clone(),
            artifacts_dir: self.artifacts_dir.clone(),
        }
    }
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub select: SelectArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "atoz-e2e",
            "run",
            "--base-url",
            "http://localhost:8080",
            "--suite",
            "footer",
            "-s",
            "routes",
            "--headed",
            "-j",
            "2",
            "--json",
            "report.json",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(overrides.suites, Some(vec![Suite::Footer, Suite::Routes]));
        assert_eq!(overrides.headless, Some(false));
        assert_eq!(overrides.workers, Some(2));
        assert_eq!(overrides.json_report, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn absent_flags_leave_configuration_alone() {
        let cli = Cli::try_parse_from(["atoz-e2e", "run"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let overrides = args.overrides();
        assert!(overrides.headless.is_none());
        assert!(overrides.suites.is_none());
        assert!(overrides.base_url.is_none());
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from(["atoz-e2e", "list", "--no-color", "-v"]).unwrap();
        assert!(cli.no_color);
        assert!(cli.verbose);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["atoz-e2e", "-v", "-q", "list"]).is_err());
    }

    #[test]
    fn unknown_suites_are_rejected() {
        assert!(Cli::try_parse_from(["atoz-e2e", "list", "--suite", "checkout"]).is_err());
    }
}
