//! The seam between journeys and the browser.
//!
//! [`Session`](crate::session::Session) only needs five primitives from a
//! browsing context. Real runs implement them with an `atoz_browser::Page`;
//! unit tests implement them over an in-memory site.

use async_trait::async_trait;
use atoz_browser::{ElementState, Page, Result, Selector};

/// Primitive operations a journey is built from.
#[async_trait]
pub trait BrowsingContext: Send + Sync {
    /// Navigates to an absolute URL and waits for the document to be ready.
    async fn load(&self, url: &str) -> Result<()>;

    /// Current document URL.
    async fn current_url(&self) -> Result<String>;

    /// Current document title.
    async fn title(&self) -> Result<String>;

    /// Snapshot of the first match of `selector`.
    async fn inspect(&self, selector: &Selector, attributes: &[&str]) -> Result<ElementState>;

    /// Activates the first match; `false` when nothing matched.
    async fn click(&self, selector: &Selector) -> Result<bool>;
}

#[async_trait]
impl BrowsingContext for Page {
    async fn load(&self, url: &str) -> Result<()> {
        self.navigate(url).await
    }

    async fn current_url(&self) -> Result<String> {
        self.url().await
    }

    async fn title(&self) -> Result<String> {
        Page::title(self).await
    }

    async fn inspect(&self, selector: &Selector, attributes: &[&str]) -> Result<ElementState> {
        Page::inspect(self, selector, attributes).await
    }

    async fn click(&self, selector: &Selector) -> Result<bool> {
        Page::click(self, selector).await
    }
}
