//! Runs scenarios concurrently, each in its own browser context.
//!
//! One Chrome process serves the whole run. Every scenario gets a fresh
//! isolated context that is disposed when the scenario ends, whether it
//! passed, failed or ran out of time.

use crate::context::BrowsingContext;
use crate::error::{AssertionError, CliError};
use crate::report::{FailureDetail, RunReport, ScenarioOutcome};
use crate::scenario::Scenario;
use crate::session::{JourneyEnd, Session};
use atoz_browser::{HttpSite, Site, TestBrowser, TestBrowserConfig, WaitConfig};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Execution settings for a run.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Scenarios executing at the same time.
    pub workers: usize,
    /// Bound on every individual wait.
    pub wait: WaitConfig,
    /// Bound on a whole scenario.
    pub scenario_timeout: Duration,
    /// Where failure screenshots go; `None` disables them.
    pub artifacts_dir: Option<PathBuf>,
    /// Skip the up-front request to the base URL.
    pub skip_health_check: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            wait: WaitConfig::default(),
            scenario_timeout: Duration::from_secs(120),
            artifacts_dir: None,
            skip_health_check: false,
        }
    }
}

/// Runs one scenario against an already prepared context.
///
/// Never fails: every problem becomes part of the returned outcome.
pub async fn execute_scenario(
    context: &dyn BrowsingContext,
    site: &dyn Site,
    wait: WaitConfig,
    scenario: &Scenario,
    budget: Duration,
) -> ScenarioOutcome {
    let started = Instant::now();
    let progress = AtomicUsize::new(0);
    let session = Session::new(context, site, wait, &progress);

    let result = tokio::time::timeout(budget, session.run(&scenario.steps)).await;
    let elapsed = started.elapsed();

    match result {
        Ok(Ok(JourneyEnd::Completed)) => ScenarioOutcome::passed(scenario, elapsed, scenario.steps.len(), None),
        Ok(Ok(JourneyEnd::ShortCircuited { index, selector })) => ScenarioOutcome::passed(
            scenario,
            elapsed,
            index + 1,
            Some(format!("ended after step {}: no element matches {selector}", index + 1)),
        ),
        Ok(Err(failure)) => ScenarioOutcome::failed(
            scenario,
            elapsed,
            FailureDetail::new(failure.index, failure.step, &failure.error),
        ),
        Err(_) => {
            let index = progress.load(Ordering::SeqCst);
            let step = scenario.steps.get(index).map(ToString::to_string).unwrap_or_default();
            ScenarioOutcome::failed(
                scenario,
                elapsed,
                FailureDetail::new(index, step, &AssertionError::ScenarioAborted { budget }),
            )
        }
    }
}

/// Owns the browser for the duration of a run.
pub struct Runner {
    site: HttpSite,
    browser_config: TestBrowserConfig,
    options: RunnerOptions,
}

impl Runner {
    pub fn new(site: HttpSite, browser_config: TestBrowserConfig, options: RunnerOptions) -> Self {
        Self {
            site,
            browser_config: browser_config.with_wait(options.wait),
            options,
        }
    }

    /// Runs `scenarios` and collects their outcomes in the given order.
    ///
    /// # Errors
    ///
    /// Fails only when the site is down or the browser cannot start.
    /// Scenario failures are part of the report.
    pub async fn run(&self, scenarios: &[Scenario]) -> Result<RunReport, CliError> {
        let started_at = Utc::now();
        let started = Instant::now();

        if self.options.skip_health_check {
            debug!("skipping health check");
        } else {
            self.site.health_check().await?;
            debug!(base_url = %self.site.base_url(), "site is up");
        }

        if let Some(dir) = &self.options.artifacts_dir {
            tokio::fs::create_dir_all(dir).await.map_err(|source| CliError::Write {
                path: dir.clone(),
                source,
            })?;
        }

        let browser = TestBrowser::launch(self.browser_config.clone()).await?;
        info!(
            scenarios = scenarios.len(),
            workers = self.options.workers,
            "running scenarios"
        );

        let mut outcomes: Vec<(usize, ScenarioOutcome)> = stream::iter(scenarios.iter().enumerate())
            .map(|(index, scenario)| {
                let browser = &browser;
                async move { (index, self.run_isolated(browser, scenario).await) }
            })
            .buffer_unordered(self.options.workers.max(1))
            .collect()
            .await;
        outcomes.sort_by_key(|(index, _)| *index);

        if let Err(e) = browser.close().await {
            warn!("failed to close browser: {e}");
        }

        Ok(RunReport::new(
            started_at,
            self.site.base_url(),
            started.elapsed(),
            outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
        ))
    }

    async fn run_isolated(&self, browser: &TestBrowser, scenario: &Scenario) -> ScenarioOutcome {
        debug!(scenario = %scenario.id(), "starting");

        let context = match browser.new_context().await {
            Ok(context) => context,
            Err(e) => {
                let error = AssertionError::Browser(e);
                return ScenarioOutcome::failed(
                    scenario,
                    Duration::ZERO,
                    FailureDetail::new(0, "create browser context".to_string(), &error),
                );
            }
        };

        let mut outcome = execute_scenario(
            context.page(),
            &self.site,
            self.options.wait,
            scenario,
            self.options.scenario_timeout,
        )
        .await;

        if outcome.is_failure() {
            warn!(scenario = %scenario.id(), "failed");
            if let Some(dir) = &self.options.artifacts_dir {
                outcome.screenshot = capture(context.page(), dir, scenario).await;
            }
        } else {
            info!(scenario = %scenario.id(), "passed");
        }

        if let Err(e) = context.close().await {
            warn!(scenario = %scenario.id(), "failed to dispose context: {e}");
        }
        outcome
    }
}

async fn capture(page: &atoz_browser::Page, dir: &Path, scenario: &Scenario) -> Option<PathBuf> {
    let path = artifact_path(dir, scenario);
    let png = match page.screenshot().await {
        Ok(png) => png,
        Err(e) => {
            warn!(scenario = %scenario.id(), "screenshot failed: {e}");
            return None;
        }
    };
    match tokio::fs::write(&path, png).await {
        Ok(()) => Some(path),
        Err(e) => {
            warn!(path = %path.display(), "failed to write screenshot: {e}");
            None
        }
    }
}

/// `{dir}/{suite}-{slug}.png`
fn artifact_path(dir: &Path, scenario: &Scenario) -> PathBuf {
    let mut slug = String::with_capacity(scenario.name.len());
    for c in scenario.name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    dir.join(format!("{}-{}.png", scenario.suite, slug.trim_matches('-')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{details_link, Letter, Route};
    use crate::report::Status;
    use crate::scenario::Suite;
    use crate::scenarios::{catalogue, CatalogueOptions};
    use crate::step::Step;
    use crate::testing::FakeSite;

    fn quick() -> WaitConfig {
        WaitConfig::new(Duration::from_millis(30), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn whole_catalogue_passes_against_a_healthy_site() {
        for scenario in catalogue(&CatalogueOptions::default()) {
            let site = FakeSite::landscape();
            let outcome = execute_scenario(&site, &site, quick(), &scenario, Duration::from_secs(5)).await;
            assert_eq!(outcome.status, Status::Passed, "{}: {:?}", scenario.id(), outcome.failure);
        }
    }

    #[tokio::test]
    async fn guarded_journeys_report_where_they_stopped() {
        let scenario = Scenario::new(
            Suite::Levels,
            "letter z details",
            vec![
                Step::Load(Route::Letter(Letter::LAST)),
                Step::IfPresent(details_link()),
                Step::visible(details_link()),
            ],
        );
        let site = FakeSite::landscape();
        let outcome = execute_scenario(&site, &site, quick(), &scenario, Duration::from_secs(5)).await;

        assert_eq!(outcome.status, Status::Passed);
        assert_eq!(outcome.steps_run, 2);
        assert!(outcome.note.unwrap().contains("Details"));
    }

    #[tokio::test]
    async fn failures_carry_step_and_kind() {
        let scenario = Scenario::new(
            Suite::Homepage,
            "missing",
            vec![Step::Load(Route::Home), Step::visible(atoz_browser::Selector::css("#gone"))],
        );
        let site = FakeSite::landscape();
        let outcome = execute_scenario(&site, &site, quick(), &scenario, Duration::from_secs(5)).await;

        let failure = outcome.failure.unwrap();
        assert_eq!(failure.step_index, 1);
        assert_eq!(failure.kind, "ElementNotFound");
        assert!(failure.message.contains("#gone"));
    }

    #[tokio::test]
    async fn stalled_loads_fail_as_navigation_timeouts() {
        let scenario = Scenario::new(Suite::Routes, "stalled", vec![Step::Load(Route::Posts)]);
        let site = FakeSite::landscape().stalled();
        let outcome = execute_scenario(&site, &site, quick(), &scenario, Duration::from_secs(5)).await;

        assert_eq!(outcome.status, Status::Failed);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.step_index, 0);
        assert_eq!(failure.kind, "NavigationTimeout");
        assert!(failure.message.contains("/posts/"), "{}", failure.message);
    }

    #[tokio::test]
    async fn budget_aborts_the_scenario_at_the_current_step() {
        let scenario = Scenario::new(
            Suite::Routes,
            "slow",
            vec![Step::Load(Route::Posts), Step::Load(Route::Home), Step::ExpectBodyText],
        );
        let site = FakeSite::landscape().with_load_delay(Duration::from_millis(60));
        let outcome = execute_scenario(&site, &site, quick(), &scenario, Duration::from_millis(100)).await;

        assert_eq!(outcome.status, Status::Failed);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.kind, "ScenarioAborted");
        assert_eq!(failure.step_index, 1);
        assert_eq!(failure.step, "load /");
    }

    #[test]
    fn artifact_names_are_slugged() {
        let scenario = Scenario::new(Suite::Footer, "Next button: is inert!", Vec::new());
        let path = artifact_path(Path::new("/tmp/atoz"), &scenario);
        assert_eq!(path, PathBuf::from("/tmp/atoz/footer-next-button-is-inert.png"));
    }
}
