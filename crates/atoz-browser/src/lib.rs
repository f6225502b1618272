//! # atoz-browser
//!
//! Headless Chrome driving for navigation tests, built on chromiumoxide.
//!
//! ## Architecture
//!
//! - **TestBrowser**: one Chrome process per run
//! - **IsolatedContext**: a private CDP browser context per scenario
//! - **Page**: navigation, element inspection, clicks and screenshots
//! - **Selector**: CSS, `text=`, `:has-text()` and `role=` selectors resolved in-page
//! - **Site**: the base URL under test plus a health check
//! - **WaitConfig**: bounded polling for every suspension
//!
//! ## Example Usage
//!
//! ```ignore
//! use atoz_browser::{HttpSite, Selector, Site, TestBrowser, TestBrowserConfig};
//!
//! let site = HttpSite::new("http://localhost:1313");
//! let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
//! let context = browser.new_context().await?;
//! let page = context.page();
//!
//! page.navigate(&site.url("/")).await?;
//! let prev = page.inspect(&Selector::css("#prev-btn"), &["aria-disabled", "href"]).await?;
//! assert_eq!(prev.attribute("aria-disabled"), Some("true"));
//!
//! context.close().await?;
//! browser.close().await?;
//! ```
//!
//! Browser-backed tests need Chrome and are `#[ignore]`d; run them with
//! `cargo test -- --ignored`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod error;
pub mod page;
pub mod selector;
pub mod site;
pub mod wait;

pub use browser::{IsolatedContext, TestBrowser, TestBrowserConfig};
pub use error::{BrowserError, Result};
pub use page::{ElementState, Page};
pub use selector::Selector;
pub use site::{HttpSite, Site};
pub use wait::{WaitConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
