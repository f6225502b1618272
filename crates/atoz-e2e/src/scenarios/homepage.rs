//! Landing page.

use super::CatalogueOptions;
use crate::model::{letter_button, Letter, NavLink, PageKind, Route, NAV_LINKS};
use crate::scenario::{Scenario, Suite};
use crate::step::Step;
use atoz_browser::Selector;

pub(super) fn scenarios(options: &CatalogueOptions) -> Vec<Scenario> {
    let letter_pattern = PageKind::Letter.url_pattern();

    let mut structure = vec![Step::Load(Route::Home)];
    structure.extend(Route::Home.page_assertion().steps());

    vec![
        Scenario::new(
            Suite::Homepage,
            "homepage loads with correct title",
            vec![Step::Load(Route::Home), Step::ExpectTitle(Route::Home.title())],
        ),
        Scenario::new(Suite::Homepage, "homepage renders its structure", structure),
        Scenario::new(
            Suite::Homepage,
            "alphabet navigation is present",
            vec![
                Step::Load(Route::Home),
                Step::visible(Selector::text(Letter::FIRST.to_string()).first()),
                Step::visible(Selector::text(Letter::LAST.to_string()).first()),
            ],
        ),
        Scenario::new(
            Suite::Homepage,
            "featured tools grid is displayed",
            vec![Step::Load(Route::Home), Step::ExpectBodyText],
        ),
        Scenario::new(
            Suite::Homepage,
            "clicking a letter navigates to letter page",
            vec![
                Step::Load(Route::Home),
                Step::click_to(letter_button(Letter::FIRST), letter_pattern),
                Step::ExpectUrl(letter_pattern.to_string()),
            ],
        ),
        Scenario::new(
            Suite::Homepage,
            "homepage is stable across reloads",
            vec![Step::ExpectStableReload {
                route: Route::Home,
                times: options.stability_reloads,
                watched: NAV_LINKS.iter().map(NavLink::selector).collect(),
            }],
        ),
    ]
}
