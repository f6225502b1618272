//! Declarative journey steps.
//!
//! A journey is a `Vec<Step>` executed in order by a
//! [`Session`](crate::session::Session). Steps only describe what to do;
//! patterns stay as strings until execution so the catalogue can be built
//! without fallible regex compilation.

use crate::contract::ControlExpectation;
use crate::model::{PageAssertion, Route, TitleExpectation};
use atoz_browser::Selector;
use std::fmt;

/// Requirement on a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeExpectation {
    /// Attribute must exist (any value).
    Present,
    /// Attribute must not exist.
    Absent,
    /// Attribute must equal the literal.
    Equals(String),
    /// Attribute must match the regex.
    Matches(String),
}

impl fmt::Display for AttributeExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeExpectation::Present => f.write_str("present"),
            AttributeExpectation::Absent => f.write_str("absent"),
            AttributeExpectation::Equals(v) => write!(f, "{v:?}"),
            AttributeExpectation::Matches(p) => write!(f, "matching /{p}/"),
        }
    }
}

/// One action or assertion in a journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Navigate to a route and wait for the document to load.
    Load(Route),
    /// The current URL must match the pattern.
    ExpectUrl(String),
    /// The title must satisfy the expectation.
    ExpectTitle(TitleExpectation),
    /// The first match must be visible.
    ExpectVisible(Selector),
    /// The first match must have exactly this text.
    ExpectText {
        /// Element to read
        selector: Selector,
        /// Required text
        text: String,
    },
    /// `<body>` must have non-empty text.
    ExpectBodyText,
    /// At least `min` elements must match.
    ExpectCountAtLeast {
        /// Elements to count
        selector: Selector,
        /// Required minimum
        min: usize,
    },
    /// An attribute of the first match must satisfy the expectation.
    ExpectAttribute {
        /// Element to read
        selector: Selector,
        /// Attribute name
        name: String,
        /// Requirement
        expect: AttributeExpectation,
    },
    /// A navigation control must obey the enabled/disabled contract.
    ExpectControl(ControlExpectation),
    /// Click the first match and wait for the URL to match the pattern.
    ClickAndAwait {
        /// Element to activate
        selector: Selector,
        /// URL regex to wait for
        url: String,
    },
    /// Continue only if the selector matches something; otherwise the
    /// journey ends here without failing.
    IfPresent(Selector),
    /// Load a route `times` times; title and visibility of the watched selectors must not change.
    ExpectStableReload {
        /// Route to reload
        route: Route,
        /// Number of loads
        times: u32,
        /// Elements whose visibility is compared
        watched: Vec<Selector>,
    },
}

impl Step {
    /// Shorthand for [`Step::ExpectVisible`] from a selector.
    #[must_use]
    pub fn visible(selector: Selector) -> Self {
        Step::ExpectVisible(selector)
    }

    /// Shorthand for an attribute check.
    pub fn attribute(selector: Selector, name: impl Into<String>, expect: AttributeExpectation) -> Self {
        Step::ExpectAttribute {
            selector,
            name: name.into(),
            expect,
        }
    }

    /// Shorthand for a click followed by a URL wait.
    pub fn click_to(selector: Selector, url: impl Into<String>) -> Self {
        Step::ClickAndAwait {
            selector,
            url: url.into(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Load(route) => write!(f, "load {route}"),
            Step::ExpectUrl(p) => write!(f, "expect url /{p}/"),
            Step::ExpectTitle(t) => write!(f, "expect title {t}"),
            Step::ExpectVisible(s) => write!(f, "expect {s} visible"),
            Step::ExpectText { selector, text } => write!(f, "expect {selector} text {text:?}"),
            Step::ExpectBodyText => f.write_str("expect body text"),
            Step::ExpectCountAtLeast { selector, min } => write!(f, "expect {selector} count >= {min}"),
            Step::ExpectAttribute { selector, name, expect } => {
                write!(f, "expect {selector} [{name}] {expect}")
            }
            Step::ExpectControl(c) => write!(f, "expect control {} {:?}", c.selector, c.state),
            Step::ClickAndAwait { selector, url } => write!(f, "click {selector} -> /{url}/"),
            Step::IfPresent(s) => write!(f, "if present {s}"),
            Step::ExpectStableReload { route, times, .. } => write!(f, "reload {route} x{times}"),
        }
    }
}

impl PageAssertion {
    /// Steps that check this page once it is loaded.
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = vec![
            Step::ExpectUrl(self.route.url_pattern()),
            Step::ExpectTitle(self.title.clone()),
        ];
        steps.extend(self.required.iter().cloned().map(Step::ExpectVisible));
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Letter;

    #[test]
    fn page_assertion_expands_to_steps() {
        let steps = Route::Posts.page_assertion().steps();
        assert_eq!(
            steps,
            vec![
                Step::ExpectUrl("/posts/".into()),
                Step::ExpectTitle(TitleExpectation::Matches("Blog|Journey|A-to-Z".into())),
                Step::ExpectVisible(Selector::css("body")),
            ]
        );
    }

    #[test]
    fn steps_describe_themselves() {
        let click = Step::click_to(
            Selector::has_text("#alphabet-container button", "A"),
            "/letters/[a-z]/",
        );
        assert_eq!(
            click.to_string(),
            r#"click #alphabet-container button:has-text("A") -> //letters/[a-z]//"#
        );
        assert_eq!(
            Step::Load(Route::Letter(Letter::LAST)).to_string(),
            "load /letters/z/"
        );
        assert_eq!(
            Step::attribute(Selector::css("#prev-btn"), "href", AttributeExpectation::Absent).to_string(),
            "expect #prev-btn [href] absent"
        );
    }
}
