//! Error types for scenarios and the CLI.
//!
//! [`AssertionError`] is what a failing step produces. It ends the scenario
//! it belongs to and nothing else. [`CliError`] covers everything that stops
//! a whole run before or after scenarios execute: bad configuration, a site
//! that is down, a browser that will not start, or a run with failures.

mod miette;

pub use self::miette::cli_error_to_miette;

use atoz_browser::BrowserError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a scenario step failed.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// A route or URL pattern never materialized within the wait window.
    #[error("navigation to {expected} timed out after {timeout:?} (at {actual})")]
    NavigationTimeout {
        /// Route path or URL pattern that was expected
        expected: String,
        /// Last URL observed
        actual: String,
        /// The wait window
        timeout: Duration,
    },

    /// A required selector matched nothing.
    #[error("no element matches {selector}")]
    ElementNotFound {
        /// The selector as written
        selector: String,
    },

    /// The element exists but is not rendered visible.
    #[error("element {selector} is present but not visible")]
    ElementHidden {
        /// The selector as written
        selector: String,
    },

    /// A selector that must be unique matched several elements.
    #[error("{selector} matches {count} elements, expected exactly one")]
    AmbiguousMatch {
        /// The selector as written
        selector: String,
        /// Matches found
        count: usize,
    },

    /// An attribute, tag or class violated its expectation.
    #[error("{selector} {attribute}: expected {expected}, found {actual}")]
    AttributeMismatch {
        /// The selector as written
        selector: String,
        /// Attribute name (`tagName` and `class` are used for tag and class checks)
        attribute: String,
        /// What was required
        expected: String,
        /// What the page had
        actual: String,
    },

    /// The page title did not match.
    #[error("title: expected {expected}, found {actual:?}")]
    TitleMismatch {
        /// Description of the expected title
        expected: String,
        /// The page title
        actual: String,
    },

    /// An element's text did not match.
    #[error("{selector} text: expected {expected:?}, found {actual:?}")]
    TextMismatch {
        /// The selector as written
        selector: String,
        /// Required text
        expected: String,
        /// Element text
        actual: String,
    },

    /// Fewer elements than required.
    #[error("{selector}: expected at least {min} match(es), found {actual}")]
    CountMismatch {
        /// The selector as written
        selector: String,
        /// Required minimum
        min: usize,
        /// Matches found
        actual: usize,
    },

    /// Reloading a route changed what it renders.
    #[error("{route} is not stable across reloads: {detail}")]
    Unstable {
        /// Route path
        route: String,
        /// First difference found
        detail: String,
    },

    /// A title or URL pattern in a scenario does not compile.
    #[error("invalid pattern /{pattern}/: {reason}")]
    InvalidPattern {
        /// The pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// The whole-scenario budget ran out.
    #[error("scenario aborted after exceeding its {budget:?} budget")]
    ScenarioAborted {
        /// The budget
        budget: Duration,
    },

    /// The browser failed underneath the assertion.
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl AssertionError {
    /// Short, stable name of the failure class, used in reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AssertionError::NavigationTimeout { .. } => "NavigationTimeout",
            AssertionError::ElementNotFound { .. } => "ElementNotFound",
            AssertionError::ElementHidden { .. } => "ElementHidden",
            AssertionError::AmbiguousMatch { .. } => "AmbiguousMatch",
            AssertionError::AttributeMismatch { .. } => "AttributeMismatch",
            AssertionError::TitleMismatch { .. } => "TitleMismatch",
            AssertionError::TextMismatch { .. } => "TextMismatch",
            AssertionError::CountMismatch { .. } => "CountMismatch",
            AssertionError::Unstable { .. } => "Unstable",
            AssertionError::InvalidPattern { .. } => "InvalidPattern",
            AssertionError::ScenarioAborted { .. } => "ScenarioAborted",
            AssertionError::Browser(_) => "BrowserError",
        }
    }
}

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The browser or the site failed before any scenario ran.
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// No scenario matched the selection.
    #[error("No scenarios selected\n\nHint: run 'atoz-e2e list' to see scenario names")]
    NothingSelected,

    /// At least one scenario failed.
    #[error("{failed} of {total} scenario(s) failed")]
    ScenariosFailed {
        /// Failed scenarios
        failed: usize,
        /// Scenarios run
        total: usize,
    },

    /// Writing the report or an artifact failed.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named config file does not exist.
    #[error("Config file not found: {}\n\nHint: drop --config or create the file", .0.display())]
    NotFound(PathBuf),

    /// The merged configuration failed to deserialize.
    #[error("{0}\n\nHint: check atoz-e2e.toml and ATOZ_E2E_* variables")]
    Extract(String),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
