//! Page-level browser operations and navigation.
//!
//! A [`Page`] is one tab inside an isolated browsing context. Everything a
//! scenario needs from the DOM goes through [`Page::inspect`], which resolves
//! a [`Selector`] in the page and returns a serializable snapshot of the first
//! match: count, visibility, tag, text, classes and requested attributes.

use crate::error::{BrowserError, Result};
use crate::selector::{script_over_matches, Selector};
use crate::wait::{wait_for_result, WaitConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page as ChromePage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

/// Snapshot of the elements matched by a selector.
///
/// Element-specific fields describe the first match only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementState {
    /// Number of elements matched.
    pub count: usize,
    /// Whether the first match is rendered visible.
    pub visible: bool,
    /// Upper-case tag name of the first match (`"A"`, `"BUTTON"`).
    pub tag_name: Option<String>,
    /// Whitespace-normalized text content of the first match.
    pub text: Option<String>,
    /// Class list of the first match.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Requested attributes of the first match; `None` when absent.
    #[serde(default)]
    pub attributes: BTreeMap<String, Option<String>>,
}

impl ElementState {
    /// True when at least one element matched.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.count > 0
    }

    /// Value of a requested attribute, `None` when absent or not requested.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_deref())
    }

    /// True when the first match carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

const INSPECT_BODY: &str = "const el = els[0] || null; const attributes = {}; \
    for (const n of names) attributes[n] = el ? el.getAttribute(n) : null; \
    return { count: els.length, visible: !!el && visible(el), \
    tagName: el ? el.tagName : null, \
    text: el ? (el.textContent || '').replace(/\\s+/g, ' ').trim() : null, \
    classes: el ? Array.from(el.classList) : [], attributes };";

#[derive(Debug, Deserialize)]
struct Clicked {
    clicked: bool,
}

/// Represents a browser page (tab) with testing capabilities.
#[derive(Debug)]
pub struct Page {
    inner: ChromePage,
    wait: WaitConfig,
}

impl Page {
    pub(crate) fn new(page: ChromePage, wait: WaitConfig) -> Self {
        Self { inner: page, wait }
    }

    /// Navigates to an absolute URL and waits for the document to be ready.
    ///
    /// The request and the `readyState` wait share one wait window.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the navigation or the document does not
    /// finish within the window, or `NavigationFailed` if the page fails to
    /// load.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!(%url, "navigating");
        let started = Instant::now();
        let timed_out = || BrowserError::WaitTimeout {
            condition: format!("navigation to {url}"),
            timeout: self.wait.timeout,
        };

        match tokio::time::timeout(self.wait.timeout, self.inner.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(CdpError::Timeout)) | Err(_) => return Err(timed_out()),
            Ok(Err(e)) => {
                return Err(BrowserError::NavigationFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        }

        let remaining = self.wait.timeout.saturating_sub(started.elapsed());
        self.wait_for_load(WaitConfig::new(remaining, self.wait.poll_interval))
            .await
            .map_err(|e| if e.is_timeout() { timed_out() } else { e })
    }

    /// Waits until `document.readyState` is `complete`.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the document is not ready in time.
    pub async fn wait_for_load(&self, config: WaitConfig) -> Result<()> {
        wait_for_result(
            move || async move {
                let state: String = self.evaluate("document.readyState").await?;
                Ok(state == "complete")
            },
            config,
            "document ready",
        )
        .await
    }

    /// Executes JavaScript in the page context and returns the result.
    ///
    /// # Security
    ///
    /// Do not splice unsanitized input into `script`; pass data through
    /// JSON-encoded literals as the selector engine does.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails or the result cannot be deserialized.
    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    /// Resolves `selector` once and snapshots its first match.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails.
    pub async fn inspect(&self, selector: &Selector, attributes: &[&str]) -> Result<ElementState> {
        let names = serde_json::to_string(attributes)
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
        let body = format!("const names = {names}; {INSPECT_BODY}");
        let script = script_over_matches(selector, &body)?;
        self.evaluate(&script).await
    }

    /// Clicks the first match of `selector`.
    ///
    /// Returns `false` when nothing matched. The click is dispatched through
    /// `HTMLElement.click()`, which follows links like a user activation.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails.
    pub async fn click(&self, selector: &Selector) -> Result<bool> {
        let script = script_over_matches(
            selector,
            "const el = els[0]; if (!el) return { clicked: false }; el.click(); return { clicked: true };",
        )?;
        let clicked: Clicked = self.evaluate(&script).await?;
        debug!(%selector, clicked = clicked.clicked, "click");
        Ok(clicked.clicked)
    }

    /// Returns the current page URL.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails.
    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    /// Returns the page title.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails.
    pub async fn title(&self) -> Result<String> {
        self.evaluate("document.title").await
    }

    /// Takes a screenshot of the page and returns PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if screenshot capture fails.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.inner
            .screenshot(chromiumoxide::page::ScreenshotParams::default())
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    /// Closes the page.
    ///
    /// # Errors
    ///
    /// Returns an error if closing the page fails.
    pub async fn close(self) -> Result<()> {
        self.inner.close().await.map_err(BrowserError::ChromiumOxide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_state_deserializes_from_page_shape() {
        let json = r#"{
            "count": 2,
            "visible": true,
            "tagName": "A",
            "text": "Next",
            "classes": ["btn", "pointer-events-none"],
            "attributes": { "aria-disabled": "true", "href": null }
        }"#;
        let state: ElementState = serde_json::from_str(json).unwrap();

        assert!(state.exists());
        assert_eq!(state.tag_name.as_deref(), Some("A"));
        assert_eq!(state.attribute("aria-disabled"), Some("true"));
        assert_eq!(state.attribute("href"), None);
        assert!(state.has_class("pointer-events-none"));
        assert!(!state.has_class("pointer-events"));
    }

    #[test]
    fn element_state_for_no_match() {
        let json = r#"{"count":0,"visible":false,"tagName":null,"text":null,"classes":[],"attributes":{}}"#;
        let state: ElementState = serde_json::from_str(json).unwrap();
        assert!(!state.exists());
        assert_eq!(state, ElementState::default());
    }

    #[test]
    fn inspect_body_binds_expected_names() {
        assert!(INSPECT_BODY.contains("names"));
        assert!(INSPECT_BODY.contains("visible(el)"));
        assert!(INSPECT_BODY.contains("tagName"));
    }
}
