//! Journey interpreter.
//!
//! A [`Session`] walks a journey one step at a time against a single
//! browsing context. Every wait is a bounded poll with the session's
//! [`WaitConfig`]; when a poll runs out the page is inspected one last time
//! so the failure can say what was there instead.
//!
//! The first failing step ends the journey. `IfPresent` ends it early
//! without failing when its selector matches nothing.

use crate::context::BrowsingContext;
use crate::contract::{check_control, CONTROL_ATTRIBUTES};
use crate::error::AssertionError;
use crate::model::{Route, TitleExpectation};
use crate::step::{AttributeExpectation, Step};
use atoz_browser::wait::wait_for_value;
use atoz_browser::{ElementState, Selector, Site, WaitConfig};
use regex::{Regex, RegexBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// How a journey ended when no step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyEnd {
    /// Every step ran.
    Completed,
    /// An optional element was absent; steps from `index + 1` on were skipped.
    ShortCircuited {
        /// Index of the `IfPresent` step
        index: usize,
        /// The absent selector
        selector: String,
    },
}

/// A failing step.
#[derive(Debug)]
pub struct StepFailure {
    /// Zero-based index of the step in its journey.
    pub index: usize,
    /// The step, rendered.
    pub step: String,
    /// What went wrong.
    pub error: AssertionError,
}

/// Executes journeys against one browsing context.
pub struct Session<'a> {
    context: &'a dyn BrowsingContext,
    site: &'a dyn Site,
    wait: WaitConfig,
    progress: &'a AtomicUsize,
}

impl<'a> Session<'a> {
    /// Creates a session.
    ///
    /// `progress` is updated with the index of the step being executed so an
    /// aborted journey can still be reported at the right step.
    pub fn new(
        context: &'a dyn BrowsingContext,
        site: &'a dyn Site,
        wait: WaitConfig,
        progress: &'a AtomicUsize,
    ) -> Self {
        Self {
            context,
            site,
            wait,
            progress,
        }
    }

    /// Runs `steps` in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing step.
    pub async fn run(&self, steps: &[Step]) -> Result<JourneyEnd, StepFailure> {
        for (index, step) in steps.iter().enumerate() {
            self.progress.store(index, Ordering::SeqCst);
            trace!(index, %step, "step");

            let outcome = match step {
                Step::IfPresent(selector) => self
                    .is_present(selector)
                    .await
                    .map(|found| (!found).then_some(selector)),
                _ => self.execute(step).await.map(|()| None),
            };

            match outcome {
                Ok(None) => {}
                Ok(Some(selector)) => {
                    debug!(index, %selector, "optional element absent, ending journey");
                    return Ok(JourneyEnd::ShortCircuited {
                        index,
                        selector: selector.to_string(),
                    });
                }
                Err(error) => {
                    return Err(StepFailure {
                        index,
                        step: step.to_string(),
                        error,
                    });
                }
            }
        }
        Ok(JourneyEnd::Completed)
    }

    async fn is_present(&self, selector: &Selector) -> Result<bool, AssertionError> {
        Ok(self.context.inspect(selector, &[]).await?.exists())
    }

    /// Executes one step. `IfPresent` is handled by [`Session::run`].
    async fn execute(&self, step: &Step) -> Result<(), AssertionError> {
        match step {
            Step::Load(route) => self.load(route).await?,
            Step::ExpectUrl(pattern) => self.expect_url(pattern).await?,
            Step::ExpectTitle(expected) => self.expect_title(expected).await?,
            Step::ExpectVisible(selector) => {
                self.visible(selector, &[]).await?;
            }
            Step::ExpectText { selector, text } => self.expect_text(selector, text).await?,
            Step::ExpectBodyText => self.expect_body_text().await?,
            Step::ExpectCountAtLeast { selector, min } => self.expect_count(selector, *min).await?,
            Step::ExpectAttribute {
                selector,
                name,
                expect,
            } => self.expect_attribute(selector, name, expect).await?,
            Step::ExpectControl(expectation) => {
                let element = self.visible(&expectation.selector, CONTROL_ATTRIBUTES).await?;
                let state = check_control(expectation, &element)?;
                debug!(selector = %expectation.selector, ?state, "control contract holds");
            }
            Step::ClickAndAwait { selector, url } => self.click_and_await(selector, url).await?,
            Step::IfPresent(selector) => {
                self.is_present(selector).await?;
            }
            Step::ExpectStableReload {
                route,
                times,
                watched,
            } => self.expect_stable(route, *times, watched).await?,
        }
        Ok(())
    }

    async fn load(&self, route: &Route) -> Result<(), AssertionError> {
        let url = self.site.url(&route.path());
        debug!(%url, "load");
        match self.context.load(&url).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_timeout() => Err(AssertionError::NavigationTimeout {
                expected: route.path(),
                actual: self.context.current_url().await.unwrap_or_default(),
                timeout: self.wait.timeout,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn expect_url(&self, pattern: &str) -> Result<(), AssertionError> {
        let re = compile(pattern, false)?;
        let re = &re;
        let matched = self
            .poll("url", move || async move {
                let url = self.context.current_url().await?;
                Ok(re.is_match(&url).then_some(()))
            })
            .await;
        if matched.is_some() {
            return Ok(());
        }
        Err(AssertionError::NavigationTimeout {
            expected: format!("/{pattern}/"),
            actual: self.context.current_url().await?,
            timeout: self.wait.timeout,
        })
    }

    async fn expect_title(&self, expected: &TitleExpectation) -> Result<(), AssertionError> {
        let matcher = TitleMatcher::new(expected)?;
        let matcher = &matcher;
        let matched = self
            .poll("title", move || async move {
                let title = self.context.title().await?;
                Ok(matcher.matches(&title).then_some(()))
            })
            .await;
        if matched.is_some() {
            return Ok(());
        }
        Err(AssertionError::TitleMismatch {
            expected: expected.to_string(),
            actual: self.context.title().await?,
        })
    }

    /// Waits for the match to be visible and returns its snapshot.
    ///
    /// The selector must match exactly one element unless it was narrowed
    /// with [`Selector::first`].
    async fn visible(&self, selector: &Selector, attributes: &[&str]) -> Result<ElementState, AssertionError> {
        let found = self
            .poll("visible", move || async move {
                let state = self.context.inspect(selector, attributes).await?;
                Ok(state.visible.then_some(state))
            })
            .await;
        if let Some(state) = found {
            if state.count > 1 && !selector.is_first() {
                return Err(AssertionError::AmbiguousMatch {
                    selector: selector.to_string(),
                    count: state.count,
                });
            }
            return Ok(state);
        }

        let last = self.context.inspect(selector, attributes).await?;
        let selector = selector.to_string();
        Err(if last.exists() {
            AssertionError::ElementHidden { selector }
        } else {
            AssertionError::ElementNotFound { selector }
        })
    }

    async fn expect_text(&self, selector: &Selector, text: &str) -> Result<(), AssertionError> {
        self.visible(selector, &[]).await?;
        let matched = self
            .poll("text", move || async move {
                let state = self.context.inspect(selector, &[]).await?;
                Ok((state.text.as_deref() == Some(text)).then_some(()))
            })
            .await;
        if matched.is_some() {
            return Ok(());
        }
        let last = self.context.inspect(selector, &[]).await?;
        Err(AssertionError::TextMismatch {
            selector: selector.to_string(),
            expected: text.to_string(),
            actual: last.text.unwrap_or_default(),
        })
    }

    async fn expect_body_text(&self) -> Result<(), AssertionError> {
        let body = Selector::css("body");
        let state = self.visible(&body, &[]).await?;
        if state.text.as_deref().is_some_and(|t| !t.is_empty()) {
            Ok(())
        } else {
            Err(AssertionError::TextMismatch {
                selector: body.to_string(),
                expected: "non-empty text".to_string(),
                actual: String::new(),
            })
        }
    }

    async fn expect_count(&self, selector: &Selector, min: usize) -> Result<(), AssertionError> {
        let matched = self
            .poll("count", move || async move {
                let state = self.context.inspect(selector, &[]).await?;
                Ok((state.count >= min).then_some(()))
            })
            .await;
        if matched.is_some() {
            return Ok(());
        }
        let last = self.context.inspect(selector, &[]).await?;
        Err(AssertionError::CountMismatch {
            selector: selector.to_string(),
            min,
            actual: last.count,
        })
    }

    async fn expect_attribute(
        &self,
        selector: &Selector,
        name: &str,
        expect: &AttributeExpectation,
    ) -> Result<(), AssertionError> {
        let pattern = match expect {
            AttributeExpectation::Matches(p) => Some(compile(p, false)?),
            _ => None,
        };
        let satisfied = |value: Option<&str>| match expect {
            AttributeExpectation::Present => value.is_some(),
            AttributeExpectation::Absent => value.is_none(),
            AttributeExpectation::Equals(v) => value == Some(v.as_str()),
            AttributeExpectation::Matches(_) => value
                .zip(pattern.as_ref())
                .is_some_and(|(v, re)| re.is_match(v)),
        };
        let satisfied = &satisfied;

        let attributes = [name];
        let state = self.visible(selector, &attributes).await?;
        if satisfied(state.attribute(name)) {
            return Ok(());
        }

        let matched = self
            .poll("attribute", move || async move {
                let state = self.context.inspect(selector, &attributes).await?;
                Ok(satisfied(state.attribute(name)).then_some(()))
            })
            .await;
        if matched.is_some() {
            return Ok(());
        }

        let last = self.context.inspect(selector, &attributes).await?;
        Err(AssertionError::AttributeMismatch {
            selector: selector.to_string(),
            attribute: name.to_string(),
            expected: expect.to_string(),
            actual: last
                .attribute(name)
                .map_or_else(|| "absent".to_string(), |v| format!("{v:?}")),
        })
    }

    async fn click_and_await(&self, selector: &Selector, pattern: &str) -> Result<(), AssertionError> {
        let re = compile(pattern, false)?;
        let re = &re;
        self.visible(selector, &[]).await?;

        if !self.context.click(selector).await? {
            return Err(AssertionError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        debug!(%selector, %pattern, "clicked, awaiting navigation");

        let arrived = self
            .poll("url", move || async move {
                let url = self.context.current_url().await?;
                Ok(re.is_match(&url).then_some(()))
            })
            .await;
        if arrived.is_some() {
            return Ok(());
        }
        Err(AssertionError::NavigationTimeout {
            expected: format!("/{pattern}/"),
            actual: self.context.current_url().await.unwrap_or_default(),
            timeout: self.wait.timeout,
        })
    }

    async fn expect_stable(&self, route: &Route, times: u32, watched: &[Selector]) -> Result<(), AssertionError> {
        let mut baseline: Option<(String, Vec<bool>)> = None;

        for round in 0..times.max(1) {
            self.load(route).await?;
            let title = self.context.title().await?;
            let mut presence = Vec::with_capacity(watched.len());
            for selector in watched {
                let state = self.context.inspect(selector, &[]).await?;
                presence.push(state.exists() && state.visible);
            }

            match &baseline {
                None => baseline = Some((title, presence)),
                Some((first_title, first_presence)) => {
                    if *first_title != title {
                        return Err(AssertionError::Unstable {
                            route: route.path(),
                            detail: format!("load {} title {title:?} differs from {first_title:?}", round + 1),
                        });
                    }
                    if let Some(i) = (0..watched.len()).find(|&i| first_presence[i] != presence[i]) {
                        return Err(AssertionError::Unstable {
                            route: route.path(),
                            detail: format!(
                                "load {} {} visible={} but first load had visible={}",
                                round + 1,
                                watched[i],
                                presence[i],
                                first_presence[i]
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    async fn poll<T, F, Fut>(&self, what: &str, check: F) -> Option<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = atoz_browser::Result<Option<T>>>,
    {
        wait_for_value(check, self.wait, what).await.ok()
    }
}

struct TitleMatcher<'e> {
    expected: &'e TitleExpectation,
    pattern: Option<Regex>,
}

impl<'e> TitleMatcher<'e> {
    fn new(expected: &'e TitleExpectation) -> Result<Self, AssertionError> {
        let pattern = match expected {
            TitleExpectation::Matches(p) => Some(compile(p, true)?),
            _ => None,
        };
        Ok(Self { expected, pattern })
    }

    fn matches(&self, title: &str) -> bool {
        match (self.expected, &self.pattern) {
            (TitleExpectation::Contains(s), _) => title.contains(s.as_str()),
            (TitleExpectation::Matches(_), Some(re)) => re.is_match(title),
            (TitleExpectation::NonEmpty, _) => !title.is_empty(),
            (TitleExpectation::Matches(_), None) => false,
        }
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex, AssertionError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| AssertionError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ControlExpectation, DisableCause, ExpectedState};
    use crate::model::{details_link, letter_button, next_button, prev_button, Letter, INERT_MARKER};
    use crate::testing::{FakeElement, FakeSite};
    use std::time::Duration;

    fn quick() -> WaitConfig {
        WaitConfig::new(Duration::from_millis(30), Duration::from_millis(5))
    }

    async fn run(site: &FakeSite, steps: &[Step]) -> Result<JourneyEnd, StepFailure> {
        let progress = AtomicUsize::new(0);
        let session = Session::new(site, site, quick(), &progress);
        session.run(steps).await
    }

    #[tokio::test]
    async fn load_and_title() {
        let site = FakeSite::landscape();
        let end = run(
            &site,
            &[
                Step::Load(Route::Home),
                Step::ExpectTitle(TitleExpectation::Contains("CNCF Landscape Overview".into())),
            ],
        )
        .await
        .unwrap();
        assert_eq!(end, JourneyEnd::Completed);
    }

    #[tokio::test]
    async fn title_mismatch_reports_actual() {
        let site = FakeSite::landscape();
        let failure = run(
            &site,
            &[
                Step::Load(Route::Posts),
                Step::ExpectTitle(TitleExpectation::Matches("Newsletter".into())),
            ],
        )
        .await
        .unwrap_err();

        assert_eq!(failure.index, 1);
        match failure.error {
            AssertionError::TitleMismatch { actual, .. } => assert_eq!(actual, "Blog - A-to-Z Journey"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_and_hidden_elements_are_distinguished() {
        let site = FakeSite::landscape();
        let missing = run(&site, &[Step::Load(Route::Home), Step::visible(Selector::css("#nope"))])
            .await
            .unwrap_err();
        assert!(matches!(missing.error, AssertionError::ElementNotFound { .. }));

        let hidden = run(
            &site,
            &[Step::Load(Route::Home), Step::visible(Selector::css("#mobile-menu"))],
        )
        .await
        .unwrap_err();
        assert!(matches!(hidden.error, AssertionError::ElementHidden { .. }));
    }

    #[tokio::test]
    async fn click_navigates_and_url_is_checked() {
        let site = FakeSite::landscape();
        let end = run(
            &site,
            &[
                Step::Load(Route::Home),
                Step::click_to(letter_button(Letter::FIRST), "/letters/[a-z]/"),
                Step::ExpectUrl("/letters/a/".into()),
            ],
        )
        .await
        .unwrap();
        assert_eq!(end, JourneyEnd::Completed);
    }

    #[tokio::test]
    async fn click_without_navigation_times_out() {
        let site = FakeSite::landscape();
        let failure = run(
            &site,
            &[
                Step::Load(Route::Home),
                Step::click_to(letter_button(Letter::FIRST), "/tools/.+"),
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(failure.error, AssertionError::NavigationTimeout { .. }));
    }

    #[tokio::test]
    async fn if_present_short_circuits_on_absence() {
        let site = FakeSite::landscape();
        let end = run(
            &site,
            &[
                Step::Load(Route::Letter(Letter::LAST)),
                Step::IfPresent(details_link()),
                Step::visible(Selector::css("#never-checked")),
            ],
        )
        .await
        .unwrap();
        assert_eq!(
            end,
            JourneyEnd::ShortCircuited {
                index: 1,
                selector: details_link().to_string()
            }
        );
    }

    #[tokio::test]
    async fn if_present_continues_on_presence() {
        let site = FakeSite::landscape();
        let end = run(
            &site,
            &[
                Step::Load(Route::Letter(Letter::FIRST)),
                Step::IfPresent(details_link()),
                Step::click_to(details_link(), "/tools/.+"),
                Step::visible(Selector::css("a[href*=\"/letters/\"]")),
            ],
        )
        .await
        .unwrap();
        assert_eq!(end, JourneyEnd::Completed);
    }

    #[tokio::test]
    async fn control_contract_is_enforced() {
        let site = FakeSite::landscape();
        let ok = run(
            &site,
            &[
                Step::Load(Route::Home),
                Step::ExpectControl(ControlExpectation::footer_link(
                    prev_button(),
                    ExpectedState::Disabled(DisableCause::AlphabetExhausted),
                )),
                Step::ExpectControl(ControlExpectation::footer_link(
                    next_button(),
                    ExpectedState::Enabled,
                )),
            ],
        )
        .await;
        assert!(ok.is_ok(), "{ok:?}");

        site.set_element(
            "/",
            prev_button(),
            FakeElement::link("Prev", None).attr("aria-disabled", "true"),
        );
        let failure = run(
            &site,
            &[
                Step::Load(Route::Home),
                Step::ExpectControl(ControlExpectation::footer_link(
                    prev_button(),
                    ExpectedState::Disabled(DisableCause::AlphabetExhausted),
                )),
            ],
        )
        .await
        .unwrap_err();
        match failure.error {
            AssertionError::AttributeMismatch { attribute, expected, .. } => {
                assert_eq!(attribute, "class");
                assert!(expected.contains(INERT_MARKER));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_and_attribute_checks() {
        let site = FakeSite::landscape();
        let nav = Selector::css("nav a[href=\"/posts/\"]");
        let ok = run(
            &site,
            &[
                Step::Load(Route::Home),
                Step::ExpectText {
                    selector: nav.clone(),
                    text: "Blog".into(),
                },
                Step::attribute(nav.clone(), "href", AttributeExpectation::Equals("/posts/".into())),
                Step::attribute(nav.clone(), "href", AttributeExpectation::Matches("^/posts/$".into())),
                Step::attribute(prev_button(), "href", AttributeExpectation::Absent),
                Step::attribute(next_button(), "href", AttributeExpectation::Present),
            ],
        )
        .await;
        assert!(ok.is_ok(), "{ok:?}");

        let failure = run(
            &site,
            &[
                Step::Load(Route::Home),
                Step::ExpectText {
                    selector: nav,
                    text: "Posts".into(),
                },
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(failure.error, AssertionError::TextMismatch { .. }));
    }

    #[tokio::test]
    async fn count_and_body_text() {
        let site = FakeSite::landscape();
        let ok = run(
            &site,
            &[
                Step::Load(Route::Letter(Letter::FIRST)),
                Step::ExpectBodyText,
                Step::ExpectCountAtLeast {
                    selector: crate::model::external_links(),
                    min: 1,
                },
            ],
        )
        .await;
        assert!(ok.is_ok(), "{ok:?}");

        let failure = run(
            &site,
            &[
                Step::Load(Route::Letter(Letter::LAST)),
                Step::ExpectCountAtLeast {
                    selector: crate::model::external_links(),
                    min: 1,
                },
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(failure.error, AssertionError::CountMismatch { actual: 0, .. }));
    }

    #[tokio::test]
    async fn stable_reload_detects_flapping_title() {
        let site = FakeSite::landscape();
        let watched = vec![Selector::css("nav a[href=\"/posts/\"]")];
        let ok = run(
            &site,
            &[Step::ExpectStableReload {
                route: Route::Home,
                times: 3,
                watched: watched.clone(),
            }],
        )
        .await;
        assert!(ok.is_ok(), "{ok:?}");

        site.flap_title("/", "Loading…");
        let failure = run(
            &site,
            &[Step::ExpectStableReload {
                route: Route::Home,
                times: 3,
                watched,
            }],
        )
        .await
        .unwrap_err();
        assert!(matches!(failure.error, AssertionError::Unstable { .. }));
    }

    #[tokio::test]
    async fn stable_reload_detects_flapping_visibility() {
        let site = FakeSite::landscape();
        let posts = Selector::css("nav a[href=\"/posts/\"]");
        site.flap_visibility("/", posts.clone());
        let failure = run(
            &site,
            &[Step::ExpectStableReload {
                route: Route::Home,
                times: 3,
                watched: vec![Selector::css("nav a[href=\"/newsletter-preview/\"]"), posts],
            }],
        )
        .await
        .unwrap_err();
        match failure.error {
            AssertionError::Unstable { route, detail } => {
                assert_eq!(route, "/");
                assert!(detail.contains("/posts/"), "{detail}");
                assert!(detail.contains("visible=false"), "{detail}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_timeout_is_a_navigation_timeout() {
        let site = FakeSite::landscape().stalled();
        let failure = run(&site, &[Step::Load(Route::Letter(Letter::FIRST))])
            .await
            .unwrap_err();
        assert_eq!(failure.index, 0);
        assert_eq!(failure.error.kind(), "NavigationTimeout");
        match failure.error {
            AssertionError::NavigationTimeout { expected, timeout, .. } => {
                assert_eq!(expected, "/letters/a/");
                assert_eq!(timeout, quick().timeout);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn visible_requires_a_single_match() {
        let site = FakeSite::landscape();
        site.set_element(
            "/",
            prev_button(),
            FakeElement::link("Prev", None).times(2),
        );
        let failure = run(&site, &[Step::Load(Route::Home), Step::visible(prev_button())])
            .await
            .unwrap_err();
        assert_eq!(failure.index, 1);
        match failure.error {
            AssertionError::AmbiguousMatch { selector, count } => {
                assert_eq!(selector, "#prev-btn");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_match_selectors_accept_duplicates() {
        let site = FakeSite::landscape();
        let end = run(
            &site,
            &[
                Step::Load(Route::Letter(Letter::FIRST)),
                Step::visible(details_link()),
            ],
        )
        .await
        .unwrap();
        assert_eq!(end, JourneyEnd::Completed);

        let failure = run(
            &site,
            &[
                Step::Load(Route::Letter(Letter::FIRST)),
                Step::visible(Selector::has_text("a", "Details")),
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(failure.error, AssertionError::AmbiguousMatch { count: 2, .. }));
    }

    #[tokio::test]
    async fn invalid_patterns_fail_the_step() {
        let site = FakeSite::landscape();
        let failure = run(&site, &[Step::Load(Route::Home), Step::ExpectUrl("(".into())])
            .await
            .unwrap_err();
        assert!(matches!(failure.error, AssertionError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn progress_tracks_current_step() {
        let site = FakeSite::landscape();
        let progress = AtomicUsize::new(0);
        let session = Session::new(&site, &site, quick(), &progress);
        let _ = session
            .run(&[
                Step::Load(Route::Home),
                Step::ExpectBodyText,
                Step::visible(Selector::css("#nope")),
            ])
            .await;
        assert_eq!(progress.load(Ordering::SeqCst), 2);
    }
}
