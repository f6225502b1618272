//! Scenarios and how a run selects them.

use crate::step::Step;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group of related scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    /// Footer pagination controls.
    Footer,
    /// Landing page.
    Homepage,
    /// Home, letter and tool pages and the journeys between them.
    Levels,
    /// Blog, newsletter and watchlist routes.
    Routes,
}

impl Suite {
    /// All suites in catalogue order.
    pub const ALL: [Suite; 4] = [Suite::Footer, Suite::Homepage, Suite::Levels, Suite::Routes];

    /// Lower-case name used on the command line and in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Suite::Footer => "footer",
            Suite::Homepage => "homepage",
            Suite::Levels => "levels",
            Suite::Routes => "routes",
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One independent test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Owning suite.
    pub suite: Suite,
    /// Human-readable name, unique within the suite.
    pub name: String,
    /// The journey.
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(suite: Suite, name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            suite,
            name: name.into(),
            steps,
        }
    }

    /// `suite › name`, the identity shown in listings and reports.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{} › {}", self.suite, self.name)
    }
}

/// Which scenarios a run includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Suites to include; empty means all.
    pub suites: Vec<Suite>,
    /// Case-insensitive substring the scenario id must contain.
    pub filter: Option<String>,
}

impl Selection {
    /// Whether `scenario` is part of the selection.
    #[must_use]
    pub fn includes(&self, scenario: &Scenario) -> bool {
        if !self.suites.is_empty() && !self.suites.contains(&scenario.suite) {
            return false;
        }
        match &self.filter {
            Some(filter) => scenario.id().to_lowercase().contains(&filter.to_lowercase()),
            None => true,
        }
    }

    /// Keeps the selected scenarios, in their original order.
    #[must_use]
    pub fn apply(&self, scenarios: Vec<Scenario>) -> Vec<Scenario> {
        scenarios.into_iter().filter(|s| self.includes(s)).collect()
    }
}
