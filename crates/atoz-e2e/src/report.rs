//! Scenario outcomes and the run report.
//!
//! Outcomes are plain data: the runner produces them, the CLI renders them
//! for the terminal and optionally serializes them to JSON.

use crate::error::{AssertionError, CliError};
use crate::scenario::{Scenario, Suite};
use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pass or fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Every step ran, or the journey ended at an absent optional element.
    Passed,
    /// A step failed or the scenario ran out of time.
    Failed,
}

/// Where and why a scenario failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    /// Zero-based index of the failing step.
    pub step_index: usize,
    /// The failing step, rendered.
    pub step: String,
    /// Failure class, e.g. `ElementNotFound`.
    pub kind: String,
    /// Full message including selector and expected vs actual.
    pub message: String,
}

impl FailureDetail {
    pub fn new(step_index: usize, step: String, error: &AssertionError) -> Self {
        Self {
            step_index,
            step,
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub suite: Suite,
    pub name: String,
    pub status: Status,
    pub duration_ms: u64,
    /// Steps that actually executed.
    pub steps_run: usize,
    /// Steps in the journey.
    pub steps_total: usize,
    /// Informational remark, e.g. why a journey ended early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureDetail>,
    /// Screenshot captured after a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl ScenarioOutcome {
    pub fn passed(scenario: &Scenario, duration: Duration, steps_run: usize, note: Option<String>) -> Self {
        Self {
            suite: scenario.suite,
            name: scenario.name.clone(),
            status: Status::Passed,
            duration_ms: millis(duration),
            steps_run,
            steps_total: scenario.steps.len(),
            note,
            failure: None,
            screenshot: None,
        }
    }

    pub fn failed(scenario: &Scenario, duration: Duration, failure: FailureDetail) -> Self {
        Self {
            suite: scenario.suite,
            name: scenario.name.clone(),
            status: Status::Failed,
            duration_ms: millis(duration),
            steps_run: failure.step_index + 1,
            steps_total: scenario.steps.len(),
            note: None,
            failure: Some(failure),
            screenshot: None,
        }
    }

    /// `suite › name`
    #[must_use]
    pub fn id(&self) -> String {
        format!("{} › {}", self.suite, self.name)
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status == Status::Failed
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub base_url: String,
    pub duration_ms: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunReport {
    pub fn new(
        started_at: DateTime<Utc>,
        base_url: impl Into<String>,
        duration: Duration,
        outcomes: Vec<ScenarioOutcome>,
    ) -> Self {
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        Self {
            started_at,
            base_url: base_url.into(),
            duration_ms: millis(duration),
            total: outcomes.len(),
            passed: outcomes.len() - failed,
            failed,
            outcomes,
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Renders the report for a terminal.
    #[must_use]
    pub fn render(&self, color: bool) -> String {
        let palette = Palette::new(color);
        let mut out = String::new();
        let mut suite = None;

        for outcome in &self.outcomes {
            if suite != Some(outcome.suite) {
                suite = Some(outcome.suite);
                let _ = writeln!(out, "\n{}", outcome.suite.name().style(palette.heading));
            }

            let (mark, style) = match outcome.status {
                Status::Passed => ("✓", palette.pass),
                Status::Failed => ("✗", palette.fail),
            };
            let _ = writeln!(
                out,
                "  {} {} {}",
                mark.style(style),
                outcome.name,
                format_duration(Duration::from_millis(outcome.duration_ms)).style(palette.dim)
            );

            if let Some(note) = &outcome.note {
                let _ = writeln!(out, "      {}", note.style(palette.dim));
            }
            if let Some(failure) = &outcome.failure {
                let _ = writeln!(
                    out,
                    "      step {}: {}",
                    failure.step_index + 1,
                    failure.step.style(palette.dim)
                );
                let _ = writeln!(out, "      {}: {}", failure.kind.style(palette.fail), failure.message);
            }
            if let Some(shot) = &outcome.screenshot {
                let _ = writeln!(out, "      screenshot: {}", shot.display().style(palette.dim));
            }
        }

        let summary = format!(
            "{} passed, {} failed, {} total ({})",
            self.passed,
            self.failed,
            self.total,
            format_duration(Duration::from_millis(self.duration_ms))
        );
        let style = if self.success() { palette.pass } else { palette.fail };
        let _ = writeln!(out, "\n{}", summary.style(style));
        out
    }

    /// Writes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Write` when the file cannot be written.
    pub fn write_json(&self, path: &Path) -> Result<(), CliError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

struct Palette {
    heading: Style,
    pass: Style,
    fail: Style,
    dim: Style,
}

impl Palette {
    fn new(color: bool) -> Self {
        if color {
            Self {
                heading: Style::new().bold().underline(),
                pass: Style::new().green().bold(),
                fail: Style::new().red().bold(),
                dim: Style::new().dimmed(),
            }
        } else {
            Self {
                heading: Style::new(),
                pass: Style::new(),
                fail: Style::new(),
                dim: Style::new(),
            }
        }
    }
}

/// `50ms`, `1.50s`, `1m 30s`
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
