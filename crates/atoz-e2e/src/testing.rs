//! In-memory site for interpreter and runner tests.
//!
//! Elements are keyed by the exact [`Selector`] a journey uses, so a page
//! only answers for selectors that were registered on it. A selector narrowed
//! with [`Selector::first`] is looked up by its inner selector and reports at
//! most one match.

use crate::context::BrowsingContext;
use crate::model::{
    external_links, letter_button, next_button, prev_button, repository_links, Letter, Route,
    INERT_MARKER, NAV_LINKS,
};
use async_trait::async_trait;
use atoz_browser::{BrowserError, ElementState, Result, Selector, Site};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const BASE_URL: &str = "http://atoz.test";

/// Letters whose listing has catalogued entries.
pub(crate) const LISTED: [char; 2] = ['A', 'K'];

#[derive(Debug, Clone)]
pub(crate) struct FakeElement {
    tag: &'static str,
    text: String,
    visible: bool,
    count: usize,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    navigates_to: Option<String>,
}

impl FakeElement {
    pub(crate) fn new(tag: &'static str, text: &str) -> Self {
        Self {
            tag,
            text: text.to_string(),
            visible: true,
            count: 1,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            navigates_to: None,
        }
    }

    /// An anchor; with an `href` it navigates there when clicked.
    pub(crate) fn link(text: &str, href: Option<&str>) -> Self {
        let el = Self::new("A", text);
        match href {
            Some(href) => el.attr("href", href).navigates(href),
            None => el,
        }
    }

    pub(crate) fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub(crate) fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub(crate) fn times(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub(crate) fn navigates(mut self, path: &str) -> Self {
        self.navigates_to = Some(path.to_string());
        self
    }

    fn state(&self, requested: &[&str]) -> ElementState {
        ElementState {
            count: self.count,
            visible: self.visible,
            tag_name: Some(self.tag.to_string()),
            text: Some(self.text.clone()),
            classes: self.classes.clone(),
            attributes: requested
                .iter()
                .map(|name| ((*name).to_string(), self.attributes.get(*name).cloned()))
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
struct FakePage {
    title: String,
    flapping_title: Option<String>,
    /// Elements hidden on every second load.
    flapping: Vec<Selector>,
    loads: usize,
    elements: Vec<(Selector, FakeElement)>,
}

impl FakePage {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    fn with(mut self, selector: Selector, element: FakeElement) -> Self {
        self.set(selector, element);
        self
    }

    fn set(&mut self, selector: Selector, element: FakeElement) {
        match self.elements.iter_mut().find(|(s, _)| *s == selector) {
            Some(slot) => slot.1 = element,
            None => self.elements.push((selector, element)),
        }
    }

    fn find(&self, selector: &Selector) -> Option<&FakeElement> {
        let key = match selector {
            Selector::First { inner } => inner.as_ref(),
            other => other,
        };
        self.elements.iter().find(|(s, _)| s == key).map(|(_, e)| e)
    }

    fn inspect(&self, selector: &Selector, attributes: &[&str]) -> ElementState {
        let Some(element) = self.find(selector) else {
            return ElementState::default();
        };
        let mut state = element.state(attributes);
        if selector.is_first() {
            state.count = state.count.min(1);
        }
        if self.loads % 2 == 0 && self.flapping.contains(selector) {
            state.visible = false;
        }
        state
    }

    fn title(&self) -> String {
        match &self.flapping_title {
            Some(alt) if self.loads % 2 == 0 => alt.clone(),
            _ => self.title.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    current: String,
    pages: HashMap<String, FakePage>,
}

/// A site plus the single browsing context looking at it.
#[derive(Debug)]
pub(crate) struct FakeSite {
    state: Mutex<State>,
    load_delay: Option<Duration>,
    stalled: bool,
}

impl FakeSite {
    /// The A-to-Z site: home, every letter page, one tool page and the
    /// three auxiliary pages, all satisfying the built-in catalogue.
    pub(crate) fn landscape() -> Self {
        let mut pages = HashMap::new();

        let mut home = with_chrome(FakePage::new("CNCF Landscape Overview | A-to-Z"), "Featured tools")
            .with(Selector::css("#alphabet-container"), FakeElement::new("DIV", "A B C"))
            .with(Selector::text("A"), FakeElement::new("BUTTON", "A").times(4))
            .with(Selector::text("Z"), FakeElement::new("BUTTON", "Z").times(2))
            .with(Selector::css("#mobile-menu"), FakeElement::new("DIV", "Menu").hidden())
            .with(
                Selector::css("#next-btn[aria-disabled=\"false\"]"),
                FakeElement::link("Next", Some("/letters/a/")),
            );
        for letter in Letter::all() {
            let path = Route::Letter(letter).path();
            home.set(
                letter_button(letter),
                FakeElement::new("BUTTON", &letter.to_string()).navigates(&path),
            );
        }
        home = with_footer(home, None, Some(Letter::FIRST));
        pages.insert("/".to_string(), home);

        for letter in Letter::all() {
            let mut page = with_chrome(
                FakePage::new(&format!("Letter {letter} - CNCF Landscape")),
                &format!("Projects starting with {letter}"),
            );
            if LISTED.contains(&letter.upper()) {
                page = page
                    .with(
                        Selector::has_text("a", "Details"),
                        FakeElement::link("Details", Some("/tools/argo/")).times(2),
                    )
                    .with(
                        repository_links(),
                        FakeElement::link("GitHub", Some("https://github.com/argoproj/argo-cd")).times(2),
                    )
                    .with(
                        external_links(),
                        FakeElement::link("GitHub", Some("https://github.com/argoproj/argo-cd")).times(3),
                    );
            }
            page = with_footer(page, letter.prev(), letter.next());
            pages.insert(Route::Letter(letter).path(), page);
        }

        let tool = with_chrome(FakePage::new("Argo | CNCF Landscape"), "Argo: declarative GitOps")
            .with(
                Selector::css("a[href*=\"/letters/\"]"),
                FakeElement::link("Back to A", Some("/letters/a/")),
            )
            .with(
                external_links(),
                FakeElement::link("Website", Some("https://argoproj.github.io")).times(2),
            );
        pages.insert(Route::Tool("argo".into()).path(), tool);

        for (route, title) in [
            (Route::Posts, "Blog - A-to-Z Journey"),
            (Route::NewsletterPreview, "Newsletter Preview"),
            (Route::WatchlistPreview, "My Watchlist Preview"),
        ] {
            pages.insert(route.path(), with_chrome(FakePage::new(title), title));
        }

        Self {
            state: Mutex::new(State {
                current: "about:blank".to_string(),
                pages,
            }),
            load_delay: None,
            stalled: false,
        }
    }

    /// Every load takes `delay` before completing.
    pub(crate) fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    /// Loads never complete; each one fails the way a navigation that ran
    /// out of time does.
    pub(crate) fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    pub(crate) fn set_element(&self, path: &str, selector: Selector, element: FakeElement) {
        let mut state = self.lock();
        if let Some(page) = state.pages.get_mut(path) {
            page.set(selector, element);
        }
    }

    /// Every second load of `path` shows `alt` as its title.
    pub(crate) fn flap_title(&self, path: &str, alt: &str) {
        let mut state = self.lock();
        if let Some(page) = state.pages.get_mut(path) {
            page.flapping_title = Some(alt.to_string());
        }
    }

    /// `selector` on `path` is hidden on every second load.
    pub(crate) fn flap_visibility(&self, path: &str, selector: Selector) {
        let mut state = self.lock();
        if let Some(page) = state.pages.get_mut(path) {
            page.flapping.push(selector);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn go(&self, path: &str) {
        let mut state = self.lock();
        state.current = path.to_string();
        if let Some(page) = state.pages.get_mut(path) {
            page.loads += 1;
        }
    }
}

/// Body text and the top navigation shared by every page.
fn with_chrome(mut page: FakePage, body: &str) -> FakePage {
    page.set(Selector::css("body"), FakeElement::new("BODY", body));
    for link in NAV_LINKS {
        page.set(link.selector(), FakeElement::link(link.text, Some(link.href)));
    }
    page
}

fn with_footer(page: FakePage, prev: Option<Letter>, next: Option<Letter>) -> FakePage {
    let control = |target: Option<Letter>, text: &str| match target {
        Some(letter) => FakeElement::link(text, Some(Route::Letter(letter).path().as_str()))
            .attr("aria-disabled", "false"),
        None => FakeElement::link(text, None)
            .attr("aria-disabled", "true")
            .class(INERT_MARKER),
    };
    page.with(prev_button(), control(prev, "Prev"))
        .with(next_button(), control(next, "Next"))
}

#[async_trait]
impl Site for FakeSite {
    fn base_url(&self) -> &str {
        BASE_URL
    }
}

#[async_trait]
impl BrowsingContext for FakeSite {
    async fn load(&self, url: &str) -> Result<()> {
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        if self.stalled {
            return Err(BrowserError::WaitTimeout {
                condition: format!("navigation to {url}"),
                timeout: Duration::from_millis(30),
            });
        }
        let path = url.strip_prefix(BASE_URL).ok_or_else(|| BrowserError::NavigationFailed {
            url: url.to_string(),
            reason: "outside the fake site".to_string(),
        })?;
        self.go(path);
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.lock();
        Ok(format!("{BASE_URL}{}", state.current))
    }

    async fn title(&self) -> Result<String> {
        let state = self.lock();
        Ok(state.pages.get(&state.current).map(FakePage::title).unwrap_or_default())
    }

    async fn inspect(&self, selector: &Selector, attributes: &[&str]) -> Result<ElementState> {
        let state = self.lock();
        Ok(state
            .pages
            .get(&state.current)
            .map(|page| page.inspect(selector, attributes))
            .unwrap_or_default())
    }

    async fn click(&self, selector: &Selector) -> Result<bool> {
        let target = {
            let state = self.lock();
            match state.pages.get(&state.current).and_then(|page| page.find(selector)) {
                Some(el) => el.navigates_to.clone(),
                None => return Ok(false),
            }
        };
        if let Some(path) = target {
            self.go(&path);
        }
        Ok(true)
    }
}
