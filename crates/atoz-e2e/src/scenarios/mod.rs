//! The built-in scenario catalogue.
//!
//! Each suite module contributes its scenarios in a fixed order; the
//! catalogue order is the order reports are printed in.

mod footer;
mod homepage;
mod levels;
mod routes;

use crate::scenario::Scenario;

/// Knobs that change what the catalogue contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogueOptions {
    /// Loads performed by reload-stability scenarios.
    pub stability_reloads: u32,
}

impl Default for CatalogueOptions {
    fn default() -> Self {
        Self { stability_reloads: 3 }
    }
}

/// Every built-in scenario.
#[must_use]
pub fn catalogue(options: &CatalogueOptions) -> Vec<Scenario> {
    let mut all = footer::scenarios();
    all.extend(homepage::scenarios(options));
    all.extend(levels::scenarios());
    all.extend(routes::scenarios());
    all
}
