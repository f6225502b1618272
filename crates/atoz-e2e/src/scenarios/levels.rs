//! The three navigation depths: home, letter listing, tool page.
//!
//! Tool pages are only reached through a "Details" link, and not every
//! listing has one yet, so every journey into level three is guarded.

use crate::model::{
    back_to_letters, details_link, external_links, letter_button, repository_links, Letter,
    PageKind, Route, TitleExpectation,
};
use crate::scenario::{Scenario, Suite};
use crate::step::Step;
use atoz_browser::Selector;

/// Load letter A and follow its first Details link, if there is one.
fn into_tool_page() -> Vec<Step> {
    vec![
        Step::Load(Route::Letter(Letter::FIRST)),
        Step::IfPresent(details_link()),
        Step::click_to(details_link(), PageKind::Tool.url_pattern()),
    ]
}

fn tool_scenario(name: &str, checks: Vec<Step>) -> Scenario {
    let mut steps = into_tool_page();
    steps.extend(checks);
    Scenario::new(Suite::Levels, name, steps)
}

pub(super) fn scenarios() -> Vec<Scenario> {
    let first = Route::Letter(Letter::FIRST);

    let mut all = vec![
        Scenario::new(
            Suite::Levels,
            "letter page loads and displays projects",
            vec![
                Step::Load(first.clone()),
                Step::ExpectTitle(first.title()),
                Step::visible(Selector::css("body")),
            ],
        ),
        Scenario::new(
            Suite::Levels,
            "projects are organized by category",
            vec![Step::Load(first.clone()), Step::ExpectBodyText],
        ),
        Scenario::new(
            Suite::Levels,
            "projects display metadata links",
            vec![
                Step::Load(first.clone()),
                Step::ExpectCountAtLeast {
                    selector: external_links(),
                    min: 1,
                },
            ],
        ),
        Scenario::new(
            Suite::Levels,
            "details link navigates to individual tool page",
            vec![
                Step::Load(first),
                Step::visible(details_link()),
                Step::click_to(details_link(), PageKind::Tool.url_pattern()),
            ],
        ),
        tool_scenario(
            "tool page loads with project information",
            vec![
                Step::visible(Selector::css("body")),
                Step::ExpectTitle(TitleExpectation::NonEmpty),
            ],
        ),
        tool_scenario(
            "tool page has back navigation",
            vec![Step::visible(back_to_letters())],
        ),
        tool_scenario(
            "tool page displays external links",
            vec![Step::ExpectCountAtLeast {
                selector: external_links(),
                min: 1,
            }],
        ),
        Scenario::new(
            Suite::Levels,
            "user can navigate from homepage through all three levels",
            vec![
                Step::Load(Route::Home),
                Step::ExpectTitle(Route::Home.title()),
                Step::click_to(letter_button(Letter::FIRST), PageKind::Letter.url_pattern()),
                Step::IfPresent(details_link()),
                Step::click_to(details_link(), PageKind::Tool.url_pattern()),
                Step::visible(back_to_letters()),
                Step::click_to(back_to_letters(), PageKind::Letter.url_pattern()),
            ],
        ),
    ];

    all.extend(Letter::all().map(|letter| {
        Scenario::new(
            Suite::Levels,
            format!("letter {letter} with entries shows a Details link"),
            vec![
                Step::Load(Route::Letter(letter)),
                Step::IfPresent(repository_links()),
                Step::visible(details_link()),
            ],
        )
    }));

    all
}
