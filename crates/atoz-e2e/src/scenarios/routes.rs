//! Auxiliary routes reached from the top navigation.

use crate::model::{Route, NAV_LINKS};
use crate::scenario::{Scenario, Suite};
use crate::step::Step;

pub(super) fn scenarios() -> Vec<Scenario> {
    let mut all = Vec::new();

    for link in NAV_LINKS {
        let route = link.route();
        let name = link.text.to_lowercase();

        all.push(Scenario::new(
            Suite::Routes,
            format!("{name} link in navigation is present"),
            vec![
                Step::Load(Route::Home),
                Step::ExpectText {
                    selector: link.selector(),
                    text: link.text.to_string(),
                },
            ],
        ));

        let mut loads = vec![Step::Load(route.clone())];
        loads.extend(route.page_assertion().steps());
        loads.push(Step::ExpectBodyText);
        all.push(Scenario::new(Suite::Routes, format!("{name} page loads correctly"), loads));

        all.push(Scenario::new(
            Suite::Routes,
            format!("clicking {name} link navigates to {route}"),
            vec![
                Step::Load(Route::Home),
                Step::click_to(link.selector(), route.url_pattern()),
            ],
        ));
    }

    let mut persists = vec![Step::Load(Route::Posts)];
    persists.extend(NAV_LINKS.iter().map(|link| Step::visible(link.selector())));
    all.push(Scenario::new(
        Suite::Routes,
        "all navigation links are accessible from the blog",
        persists,
    ));

    all
}
