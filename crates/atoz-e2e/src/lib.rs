//! atoz-e2e - navigation assertion runner for the CNCF Landscape A-to-Z site.
//!
//! Scenarios are declarative journeys ([`step::Step`] lists) executed by a
//! [`session::Session`] against one isolated browser context each. The
//! [`runner::Runner`] executes a selection of the built-in
//! [`scenarios::catalogue`] concurrently and collects a [`report::RunReport`].
//!
//! # Architecture
//!
//! - [`model`] - routes, letters, page assertions and well-known selectors
//! - [`contract`] - the enabled/disabled rules for pagination controls
//! - [`step`] / [`session`] - journey steps and their interpreter
//! - [`context`] - the seam between the interpreter and the browser
//! - [`scenarios`] - the built-in catalogue, grouped in suites
//! - [`runner`] / [`report`] - concurrent execution and reporting
//! - [`config`], [`cli`], [`commands`], [`logger`] - the `atoz-e2e` binary
//!
//! # Example
//!
//! ```rust,no_run
//! use atoz_e2e::config::{ConfigOverrides, RunConfig};
//! use atoz_e2e::runner::Runner;
//! use atoz_e2e::scenarios::catalogue;
//! use atoz_browser::HttpSite;
//!
//! # async fn demo() -> atoz_e2e::Result<()> {
//! let config = RunConfig::load(&ConfigOverrides::default(), None)?;
//! let scenarios = catalogue(&config.catalogue_options());
//! let runner = Runner::new(
//!     HttpSite::new(config.base_url.clone()),
//!     config.browser_config(),
//!     config.runner_options(),
//! );
//! let report = runner.run(&scenarios).await?;
//! println!("{}", report.render(false));
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod contract;
pub mod error;
pub mod logger;
pub mod model;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod session;
pub mod step;

#[cfg(test)]
pub(crate) mod testing;

pub use context::BrowsingContext;
pub use error::{AssertionError, CliError, ConfigError, Result};
pub use model::{Letter, Route};
pub use report::{RunReport, ScenarioOutcome};
pub use scenario::{Scenario, Suite};
pub use step::Step;
