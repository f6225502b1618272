//! Routes, letters and the page assertions that belong to them.

use atoz_browser::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class that marks a navigation control as inert.
pub const INERT_MARKER: &str = "pointer-events-none";

/// One letter of the A–Z catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Letter(char);

impl Letter {
    /// The first letter; it has no predecessor.
    pub const FIRST: Letter = Letter('A');
    /// The last letter; it has no successor.
    pub const LAST: Letter = Letter('Z');

    /// Accepts `a`–`z` in either case.
    #[must_use]
    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_alphabetic().then(|| Letter(c.to_ascii_uppercase()))
    }

    /// All letters in order.
    pub fn all() -> impl Iterator<Item = Letter> {
        ('A'..='Z').map(Letter)
    }

    /// Upper-case form, as shown on buttons and in titles.
    #[must_use]
    pub fn upper(self) -> char {
        self.0
    }

    /// Lower-case form, the canonical path segment.
    #[must_use]
    pub fn lower(self) -> char {
        self.0.to_ascii_lowercase()
    }

    /// The preceding letter, `None` for A.
    #[must_use]
    pub fn prev(self) -> Option<Letter> {
        (self != Self::FIRST).then(|| Letter((self.0 as u8 - 1) as char))
    }

    /// The following letter, `None` for Z.
    #[must_use]
    pub fn next(self) -> Option<Letter> {
        (self != Self::LAST).then(|| Letter((self.0 as u8 + 1) as char))
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A path the site serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// `/`
    Home,
    /// `/letters/{l}/`
    Letter(Letter),
    /// `/tools/{name}/`
    Tool(String),
    /// `/posts/`
    Posts,
    /// `/newsletter-preview/`
    NewsletterPreview,
    /// `/watchlist-preview/`
    WatchlistPreview,
}

impl Route {
    /// Literal path, always with leading and trailing slash.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Letter(letter) => format!("/letters/{}/", letter.lower()),
            Route::Tool(name) => format!("/tools/{name}/"),
            Route::Posts => "/posts/".to_string(),
            Route::NewsletterPreview => "/newsletter-preview/".to_string(),
            Route::WatchlistPreview => "/watchlist-preview/".to_string(),
        }
    }

    /// The page type this route renders.
    #[must_use]
    pub fn kind(&self) -> PageKind {
        match self {
            Route::Home => PageKind::Home,
            Route::Letter(_) => PageKind::Letter,
            Route::Tool(_) => PageKind::Tool,
            Route::Posts => PageKind::Posts,
            Route::NewsletterPreview => PageKind::NewsletterPreview,
            Route::WatchlistPreview => PageKind::WatchlistPreview,
        }
    }

    /// URL regex matching exactly this route.
    #[must_use]
    pub fn url_pattern(&self) -> String {
        match self {
            Route::Home => "^[a-z]+://[^/]+/(index\\.html)?$".to_string(),
            other => regex::escape(&other.path()),
        }
    }

    /// Title the page must show.
    #[must_use]
    pub fn title(&self) -> TitleExpectation {
        match self {
            Route::Home => TitleExpectation::Contains("CNCF Landscape Overview".into()),
            Route::Letter(letter) => TitleExpectation::Matches(format!("Letter {letter}|Week.*{letter}")),
            Route::Tool(_) => TitleExpectation::NonEmpty,
            Route::Posts => TitleExpectation::Matches("Blog|Journey|A-to-Z".into()),
            Route::NewsletterPreview => TitleExpectation::Matches("Newsletter|Preview".into()),
            Route::WatchlistPreview => TitleExpectation::Matches("Watchlist|Preview".into()),
        }
    }

    /// Title pattern, required elements and route for this page.
    #[must_use]
    pub fn page_assertion(&self) -> PageAssertion {
        let required = match self {
            Route::Home => {
                let mut required = vec![
                    Selector::css("#alphabet-container"),
                    Selector::css("#prev-btn"),
                    Selector::css("#next-btn"),
                ];
                required.extend(NAV_LINKS.iter().map(NavLink::selector));
                required
            }
            Route::Tool(_) => vec![Selector::css("body"), back_to_letters()],
            _ => vec![Selector::css("body")],
        };
        PageAssertion {
            route: self.clone(),
            title: self.title(),
            required,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Page type, independent of which letter or tool is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    /// Landing page with the alphabet and featured tools.
    Home,
    /// Per-letter project listing.
    Letter,
    /// Single tool detail page.
    Tool,
    /// Blog index.
    Posts,
    /// Newsletter preview.
    NewsletterPreview,
    /// Watchlist preview.
    WatchlistPreview,
}

impl PageKind {
    /// URL regex matching any page of this kind.
    #[must_use]
    pub fn url_pattern(self) -> &'static str {
        match self {
            PageKind::Home => "^[a-z]+://[^/]+/(index\\.html)?$",
            PageKind::Letter => "/letters/[a-z]/",
            PageKind::Tool => "/tools/.+",
            PageKind::Posts => "/posts/",
            PageKind::NewsletterPreview => "/newsletter-preview/",
            PageKind::WatchlistPreview => "/watchlist-preview/",
        }
    }
}

/// What the document title must look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleExpectation {
    /// Case-sensitive substring.
    Contains(String),
    /// Case-insensitive regex.
    Matches(String),
    /// Anything but the empty string.
    NonEmpty,
}

impl fmt::Display for TitleExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleExpectation::Contains(s) => write!(f, "containing {s:?}"),
            TitleExpectation::Matches(p) => write!(f, "matching /{p}/i"),
            TitleExpectation::NonEmpty => f.write_str("non-empty"),
        }
    }
}

/// Expected state of one rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAssertion {
    /// Route the page was reached by.
    pub route: Route,
    /// Title requirement.
    pub title: TitleExpectation,
    /// Elements that must be visible.
    pub required: Vec<Selector>,
}

/// An entry of the site's top navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    /// Link target.
    pub href: &'static str,
    /// Exact link text.
    pub text: &'static str,
}

impl NavLink {
    /// `nav a[href="…"]`
    #[must_use]
    pub fn selector(&self) -> Selector {
        Selector::css(format!("nav a[href=\"{}\"]", self.href))
    }

    /// Route the link leads to.
    #[must_use]
    pub fn route(&self) -> Route {
        match self.href {
            "/posts/" => Route::Posts,
            "/newsletter-preview/" => Route::NewsletterPreview,
            _ => Route::WatchlistPreview,
        }
    }
}

/// The three auxiliary navigation links.
pub const NAV_LINKS: [NavLink; 3] = [
    NavLink {
        href: "/posts/",
        text: "Blog",
    },
    NavLink {
        href: "/newsletter-preview/",
        text: "Newsletter",
    },
    NavLink {
        href: "/watchlist-preview/",
        text: "My Watchlist",
    },
];

/// Footer "previous" control.
#[must_use]
pub fn prev_button() -> Selector {
    Selector::css("#prev-btn")
}

/// Footer "next" control.
#[must_use]
pub fn next_button() -> Selector {
    Selector::css("#next-btn")
}

/// Letter button inside the alphabet navigation.
#[must_use]
pub fn letter_button(letter: Letter) -> Selector {
    Selector::has_text("#alphabet-container button", letter.to_string())
}

/// First "Details" link of a letter listing; a listing has one per entry.
#[must_use]
pub fn details_link() -> Selector {
    Selector::has_text("a", "Details").first()
}

/// Any external link: a GitHub repository or an absolute http(s) URL.
#[must_use]
pub fn external_links() -> Selector {
    Selector::css("a[href*=\"github.com\"], a[href*=\"http\"]")
}

/// Links to a GitHub repository, present only for listed entries.
#[must_use]
pub fn repository_links() -> Selector {
    Selector::css("a[href*=\"github.com\"]")
}

/// First link from a tool page back to the letter listings.
#[must_use]
pub fn back_to_letters() -> Selector {
    Selector::css("a[href*=\"/letters/\"]").first()
}
