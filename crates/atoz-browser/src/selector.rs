//! Playwright-flavoured selectors resolved inside the page.
//!
//! Supported forms:
//!
//! - `text=Blog` matches the innermost elements whose normalized text
//!   contains "blog" (case-insensitive); `text="Blog"` requires an exact match.
//! - `nav a:has-text("Details")` is a CSS selector filtered by contained
//!   text, compared case-insensitively like `text=`.
//! - `role=link[name="Blog"]` matches by implicit or explicit ARIA role and,
//!   optionally, accessible name.
//! - Anything else is handed to `document.querySelectorAll` unchanged.
//! - `<selector> >> nth=0` keeps only the first match of any of the above.
//!
//! Callers that require a unique match check the count themselves; wrapping a
//! selector with [`Selector::first`] is how a journey opts out of that.
//!
//! Resolution always happens in the page: the selector is serialized to JSON
//! and passed as an argument to [`RESOLVE_JS`], so no selector text is ever
//! spliced into script source.

use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An element selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    /// Plain CSS.
    Css {
        /// The CSS selector
        css: String,
    },
    /// Innermost elements matching a text.
    Text {
        /// Text to look for
        text: String,
        /// Whole-text, case-sensitive comparison
        exact: bool,
    },
    /// CSS matches whose text content contains `text`, ignoring case.
    HasText {
        /// The CSS part before `:has-text(...)`
        css: String,
        /// Substring required in the element's text
        text: String,
    },
    /// ARIA role with optional accessible name.
    Role {
        /// Role name, e.g. `link`
        role: String,
        /// Accessible name, matched exactly after whitespace normalization
        name: Option<String>,
    },
    /// Only the first match of `inner`, in document order.
    First {
        /// The selector being narrowed
        inner: Box<Selector>,
    },
}

impl Selector {
    /// Builds a plain CSS selector.
    pub fn css(css: impl Into<String>) -> Self {
        Selector::Css { css: css.into() }
    }

    /// Builds a case-insensitive text selector.
    pub fn text(text: impl Into<String>) -> Self {
        Selector::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Builds a CSS selector filtered by contained text.
    pub fn has_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Selector::HasText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Builds a role selector.
    pub fn role(role: impl Into<String>, name: Option<&str>) -> Self {
        Selector::Role {
            role: role.into(),
            name: name.map(str::to_string),
        }
    }

    /// Narrows this selector to its first match.
    #[must_use]
    pub fn first(self) -> Self {
        match self {
            first @ Selector::First { .. } => first,
            inner => Selector::First { inner: Box::new(inner) },
        }
    }

    /// True when the selector is narrowed to a single match by construction.
    #[must_use]
    pub fn is_first(&self) -> bool {
        matches!(self, Selector::First { .. })
    }

    /// JSON form passed to the in-page resolver.
    ///
    /// # Errors
    ///
    /// Returns `ScriptExecutionFailed` if serialization fails.
    pub fn to_js_arg(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css { css } => f.write_str(css),
            Selector::Text { text, exact: true } => write!(f, "text=\"{text}\""),
            Selector::Text { text, exact: false } => write!(f, "text={text}"),
            Selector::HasText { css, text } => write!(f, "{css}:has-text(\"{text}\")"),
            Selector::Role { role, name: Some(name) } => write!(f, "role={role}[name=\"{name}\"]"),
            Selector::Role { role, name: None } => write!(f, "role={role}"),
            Selector::First { inner } => write!(f, "{inner} >> nth=0"),
        }
    }
}

/// In-page resolver: `(query) => Element[]`.
///
/// Text comparisons collapse whitespace first. `text=` keeps only the
/// innermost matches so that `text=A` points at the letter button rather than
/// at `<body>`.
pub const RESOLVE_JS: &str = r#"(query) => {
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const all = (css) => Array.from(document.querySelectorAll(css));
  const skip = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE', 'HEAD', 'TITLE']);
  const implicitRole = (el) => {
    const tag = el.tagName.toLowerCase();
    if (tag === 'a' || tag === 'area') return el.hasAttribute('href') ? 'link' : null;
    if (tag === 'button') return 'button';
    if (tag === 'nav') return 'navigation';
    if (tag === 'main') return 'main';
    if (tag === 'footer') return 'contentinfo';
    if (tag === 'header') return 'banner';
    if (/^h[1-6]$/.test(tag)) return 'heading';
    if (tag === 'ul' || tag === 'ol') return 'list';
    if (tag === 'li') return 'listitem';
    if (tag === 'img') return 'img';
    return null;
  };
  const accessibleName = (el) => norm(el.getAttribute('aria-label') || el.textContent);
  switch (query.kind) {
    case 'css':
      return all(query.css);
    case 'has_text':
      return all(query.css).filter((el) =>
        norm(el.textContent).toLowerCase().includes(query.text.toLowerCase()));
    case 'text': {
      const wanted = query.exact ? query.text : query.text.toLowerCase();
      const hits = all('body, body *').filter((el) => {
        if (skip.has(el.tagName)) return false;
        const text = norm(el.textContent);
        return query.exact ? text === wanted : text.toLowerCase().includes(wanted);
      });
      return hits.filter((el) => !hits.some((other) => other !== el && el.contains(other)));
    }
    case 'role':
      return all('body *').filter((el) => {
        const role = el.getAttribute('role') || implicitRole(el);
        if (role !== query.role) return false;
        return query.name == null || accessibleName(el) === query.name;
      });
    case 'first':
      return resolve(query.inner).slice(0, 1);
    default:
      return [];
  }
}"#;

/// In-page visibility check: `(el) => boolean`.
///
/// Visible means a non-empty bounding box and no `visibility: hidden`.
pub const VISIBLE_JS: &str = r#"(el) => {
  const rect = el.getBoundingClientRect();
  const style = window.getComputedStyle(el);
  return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden';
}"#;

/// Builds an expression that resolves `selector` and applies `body` to the
/// resulting array `els`, with `visible` bound to [`VISIBLE_JS`].
///
/// # Errors
///
/// Returns `ScriptExecutionFailed` if the selector cannot be serialized.
pub fn script_over_matches(selector: &Selector, body: &str) -> Result<String> {
    let arg = selector.to_js_arg()?;
    Ok(format!(
        "(() => {{ const resolve = {RESOLVE_JS}; const visible = {VISIBLE_JS}; \
         const els = resolve({arg}); {body} }})()"
    ))
}
