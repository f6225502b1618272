//! Footer pagination controls.

use crate::contract::{ControlExpectation, DisableCause, ExpectedState};
use crate::model::{next_button, prev_button, Letter, PageKind, Route};
use crate::scenario::{Scenario, Suite};
use crate::step::Step;
use atoz_browser::Selector;

/// Both footer controls on `route` and the state each must be in.
fn footer_contract(route: Route, prev: ExpectedState, next: ExpectedState) -> Vec<Step> {
    vec![
        Step::Load(route),
        Step::ExpectControl(ControlExpectation::footer_link(prev_button(), prev)),
        Step::ExpectControl(ControlExpectation::footer_link(next_button(), next)),
    ]
}

/// A control pointing at `target` on a letter page. Without a neighbour
/// the alphabet is exhausted and the control must be inert.
fn towards(target: Option<Letter>) -> ExpectedState {
    match target {
        Some(_) => ExpectedState::Any(DisableCause::Other),
        None => ExpectedState::Disabled(DisableCause::AlphabetExhausted),
    }
}

fn letter_footer(letter: Letter) -> Vec<Step> {
    footer_contract(Route::Letter(letter), towards(letter.prev()), towards(letter.next()))
}

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            Suite::Footer,
            "footer navigation buttons are accessible links",
            footer_contract(
                Route::Home,
                ExpectedState::Any(DisableCause::AlphabetExhausted),
                ExpectedState::Any(DisableCause::Other),
            ),
        ),
        Scenario::new(
            Suite::Footer,
            "first letter page footer obeys the control contract",
            letter_footer(Letter::FIRST),
        ),
        Scenario::new(
            Suite::Footer,
            "last letter page next button is inert",
            letter_footer(Letter::LAST),
        ),
        Scenario::new(
            Suite::Footer,
            "enabled next button navigates to a letter page",
            vec![
                Step::Load(Route::Home),
                Step::IfPresent(Selector::css("#next-btn[aria-disabled=\"false\"]")),
                Step::click_to(next_button(), PageKind::Letter.url_pattern()),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls(steps: &[Step]) -> (&ControlExpectation, &ControlExpectation) {
        match steps {
            [Step::Load(_), Step::ExpectControl(prev), Step::ExpectControl(next)] => (prev, next),
            other => panic!("unexpected footer steps {other:?}"),
        }
    }

    #[test]
    fn home_prev_must_carry_the_marker_when_disabled() {
        let steps = &scenarios()[0].steps;
        let (prev, next) = controls(steps);
        assert_eq!(prev.state, ExpectedState::Any(DisableCause::AlphabetExhausted));
        assert_eq!(prev.tag, Some("A"));
        assert_eq!(next.state, ExpectedState::Any(DisableCause::Other));
    }

    #[test]
    fn last_letter_next_must_be_disabled() {
        let steps = letter_footer(Letter::LAST);
        let (prev, next) = controls(&steps);
        assert_eq!(next.state, ExpectedState::Disabled(DisableCause::AlphabetExhausted));
        assert_eq!(prev.state, ExpectedState::Any(DisableCause::Other));
    }

    #[test]
    fn first_letter_prev_must_be_disabled() {
        let steps = letter_footer(Letter::FIRST);
        let (prev, next) = controls(&steps);
        assert_eq!(prev.state, ExpectedState::Disabled(DisableCause::AlphabetExhausted));
        assert_eq!(next.state, ExpectedState::Any(DisableCause::Other));
    }

    #[test]
    fn middle_letters_accept_either_state() {
        let steps = letter_footer(Letter::new('k').unwrap());
        let (prev, next) = controls(&steps);
        assert_eq!(prev.state, ExpectedState::Any(DisableCause::Other));
        assert_eq!(next.state, ExpectedState::Any(DisableCause::Other));
    }
}
