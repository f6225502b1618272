//! The site under test.
//!
//! The driver never starts the site. It only needs a base URL to join route
//! paths onto, plus an optional health check so a run against a site that is
//! down fails once, up front, instead of once per scenario.

use crate::error::{BrowserError, Result};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// A running website that scenarios navigate.
///
/// The trait is object-safe so runners can hold a `&dyn Site`.
#[async_trait]
pub trait Site: Send + Sync {
    /// Returns the base URL of the site (e.g., `<http://localhost:1313>`).
    fn base_url(&self) -> &str;

    /// Checks that the site answers before any browser work starts.
    ///
    /// The default implementation assumes the site is healthy.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Returns a full URL by joining a path to the base URL.
    ///
    /// # Example
    ///
    /// ```ignore
    /// site.url("/letters/a/") // "http://localhost:1313/letters/a/"
    /// ```
    fn url(&self, path: &str) -> String {
        let base = self.base_url().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl fmt::Debug for dyn Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("base_url", &self.base_url())
            .finish()
    }
}

/// A site served over HTTP(S) at a fixed base URL.
///
/// The health check issues a `GET` against the base URL and requires a
/// success status.
#[derive(Debug, Clone)]
pub struct HttpSite {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSite {
    /// Timeout applied to the health-check request.
    pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a site handle for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Site for HttpSite {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health_check(&self) -> Result<()> {
        let url = self.url("/");
        debug!(%url, "checking site health");

        let unavailable = |reason: String| BrowserError::SiteUnavailable {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .timeout(Self::HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(unavailable(format!("HTTP {status}")))
        }
    }
}
