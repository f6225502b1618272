//! Enabled/disabled contract for navigation controls.
//!
//! A control is enabled exactly when `aria-disabled` reads `"false"`; any
//! other value, including a missing attribute, means disabled.
//!
//! - enabled: carries a non-empty `href`, does not carry the inert marker
//! - disabled: carries no `href`; carries the inert marker only when it is
//!   disabled because the alphabet ran out
//!
//! Controls disabled for other reasons (a letter not yet published, content
//! still loading) keep pointer events so they can show a tooltip, which is
//! why the marker is not required for them.

use crate::error::AssertionError;
use crate::model::INERT_MARKER;
use atoz_browser::{ElementState, Selector};
use serde::{Deserialize, Serialize};

/// Attributes the contract needs from the page.
pub const CONTROL_ATTRIBUTES: &[&str] = &["aria-disabled", "href"];

/// Why a control may be disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisableCause {
    /// Past the first or last letter.
    AlphabetExhausted,
    /// Anything else; the inert marker is optional.
    Other,
}

/// Which state the control must be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedState {
    /// Either state, checked for internal consistency.
    Any(DisableCause),
    /// Must be enabled.
    Enabled,
    /// Must be disabled, for the given reason.
    Disabled(DisableCause),
}

/// A control and the state it must be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlExpectation {
    /// How to find the control.
    pub selector: Selector,
    /// Required upper-case tag name, if any.
    pub tag: Option<&'static str>,
    /// Required state.
    pub state: ExpectedState,
}

impl ControlExpectation {
    /// A footer pagination link: always an `<a>`.
    #[must_use]
    pub fn footer_link(selector: Selector, state: ExpectedState) -> Self {
        Self {
            selector,
            tag: Some("A"),
            state,
        }
    }
}

/// Observed state of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// `aria-disabled="false"`
    Enabled,
    /// Anything else.
    Disabled,
}

impl ControlState {
    /// Reads the state from an element snapshot.
    #[must_use]
    pub fn of(element: &ElementState) -> Self {
        if element.attribute("aria-disabled") == Some("false") {
            ControlState::Enabled
        } else {
            ControlState::Disabled
        }
    }
}

/// Checks a control snapshot against its expectation.
///
/// # Errors
///
/// Returns `AttributeMismatch` naming the first rule that is broken.
pub fn check_control(
    expectation: &ControlExpectation,
    element: &ElementState,
) -> Result<ControlState, AssertionError> {
    let selector = expectation.selector.to_string();
    let mismatch = |attribute: &str, expected: &str, actual: String| AssertionError::AttributeMismatch {
        selector: selector.clone(),
        attribute: attribute.to_string(),
        expected: expected.to_string(),
        actual,
    };

    if let Some(tag) = expectation.tag {
        let actual = element.tag_name.as_deref().unwrap_or("");
        if !actual.eq_ignore_ascii_case(tag) {
            return Err(mismatch("tagName", tag, describe(element.tag_name.as_deref())));
        }
    }

    let observed = ControlState::of(element);
    let aria = || describe(element.attribute("aria-disabled"));

    let cause = match (expectation.state, observed) {
        (ExpectedState::Enabled, ControlState::Disabled) => {
            return Err(mismatch("aria-disabled", "\"false\"", aria()));
        }
        (ExpectedState::Disabled(_), ControlState::Enabled) => {
            return Err(mismatch("aria-disabled", "anything but \"false\"", aria()));
        }
        (ExpectedState::Any(cause) | ExpectedState::Disabled(cause), _) => Some(cause),
        (ExpectedState::Enabled, ControlState::Enabled) => None,
    };

    let href = element.attribute("href");
    let inert = element.has_class(INERT_MARKER);

    match observed {
        ControlState::Enabled => {
            if href.is_none_or(str::is_empty) {
                return Err(mismatch("href", "present on an enabled control", describe(href)));
            }
            if inert {
                return Err(mismatch(
                    "class",
                    &format!("no {INERT_MARKER} on an enabled control"),
                    element.classes.join(" "),
                ));
            }
        }
        ControlState::Disabled => {
            if href.is_some() {
                return Err(mismatch("href", "absent on a disabled control", describe(href)));
            }
            if cause == Some(DisableCause::AlphabetExhausted) && !inert {
                return Err(mismatch(
                    "class",
                    &format!("{INERT_MARKER} at the end of the alphabet"),
                    element.classes.join(" "),
                ));
            }
        }
    }

    Ok(observed)
}

fn describe(value: Option<&str>) -> String {
    value.map_or_else(|| "absent".to_string(), |v| format!("{v:?}"))
}
