//! Fragment descriptors: what to render, and where the client should patch it.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::error::ComposeError;

/// Characters a target selector may contain. Anything else could break out of
/// the directive attribute.
static SELECTOR_ALLOW_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9\-_#.: \[\]=]*$").expect("Invalid selector allow-list regex")
});

/// DOM patch operation applied to a fragment's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Replace the target element.
    OuterHtml,
    /// Replace the target's contents.
    InnerHtml,
    /// Prepend inside the target.
    AfterBegin,
    /// Append inside the target.
    BeforeEnd,
    /// Insert before the target.
    BeforeBegin,
    /// Insert after the target.
    AfterEnd,
    /// Remove the target.
    Delete,
    /// No patch (main slot marker).
    None,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::OuterHtml => "outerHTML",
            Disposition::InnerHtml => "innerHTML",
            Disposition::AfterBegin => "afterbegin",
            Disposition::BeforeEnd => "beforeend",
            Disposition::BeforeBegin => "beforebegin",
            Disposition::AfterEnd => "afterend",
            Disposition::Delete => "delete",
            Disposition::None => "none",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject selectors containing characters outside the allow-list.
pub fn validate_selector(selector: &str) -> Result<(), ComposeError> {
    if SELECTOR_ALLOW_LIST.is_match(selector) {
        Ok(())
    } else {
        Err(ComposeError::InvalidSelector(selector.to_string()))
    }
}

/// One fragment to render: a named view, its model, and its patch directive.
///
/// Built by the result pipeline, consumed once by the composer.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    view: String,
    model: Value,
    disposition: Disposition,
    target: Option<String>,
}

impl Fragment {
    /// A main-slot fragment (written unwrapped, no directive).
    pub fn main(view: impl Into<String>, model: Value) -> Self {
        Self {
            view: view.into(),
            model,
            disposition: Disposition::None,
            target: None,
        }
    }

    /// An out-of-band fragment with the given disposition.
    pub fn oob(view: impl Into<String>, model: Value, disposition: Disposition) -> Self {
        Self {
            view: view.into(),
            model,
            disposition,
            target: None,
        }
    }

    /// Patch the element matching `selector` instead of the fragment's own id.
    /// Validated when composed.
    pub fn target(mut self, selector: impl Into<String>) -> Self {
        self.target = Some(selector.into());
        self
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn model(&self) -> &Value {
        &self.model
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn target_selector(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Directive value: `{disposition}` or `{disposition}:{selector}`.
    pub fn directive(&self) -> String {
        match &self.target {
            Some(selector) => format!("{}:{}", self.disposition, selector),
            None => self.disposition.to_string(),
        }
    }
}
