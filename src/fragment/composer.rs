//! SwapComposer - assembles one response body from several fragments.
//!
//! Output order is fixed: the main fragment (unwrapped), then each
//! out-of-band fragment in call order. Every OOB fragment gets the directive
//! attribute on its root element and is wrapped in an inert `<template>` so
//! the client treats it as out-of-band wherever it appears in the body.
//!
//! All selectors are validated before anything renders, and the body is
//! fully buffered: a failure anywhere yields an error and no output.

use std::borrow::Cow;
use std::sync::Arc;

use super::descriptor::{validate_selector, Fragment};
use super::error::ComposeError;
use super::renderer::FragmentRenderer;

/// Attribute carrying the DOM patch directive.
pub const SWAP_OOB_ATTR: &str = "hx-swap-oob";

pub struct SwapComposer {
    renderer: Arc<dyn FragmentRenderer>,
}

impl SwapComposer {
    pub fn new(renderer: Arc<dyn FragmentRenderer>) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &Arc<dyn FragmentRenderer> {
        &self.renderer
    }

    /// Render `main` (if any) and every OOB fragment into one body.
    pub fn compose(&self, main: Option<&Fragment>, oobs: &[Fragment]) -> Result<String, ComposeError> {
        for fragment in main.into_iter().chain(oobs) {
            if let Some(selector) = fragment.target_selector() {
                validate_selector(selector)?;
            }
        }

        let mut parts: Vec<String> = Vec::with_capacity(oobs.len() + 1);
        if let Some(main) = main {
            parts.push(self.renderer.render(main.view(), main.model())?);
        }
        for fragment in oobs {
            let html = self.renderer.render(fragment.view(), fragment.model())?;
            parts.push(wrap_oob(&html, &fragment.directive()));
        }

        tracing::debug!(
            main = main.map(Fragment::view),
            oob = oobs.len(),
            "fragments composed"
        );
        Ok(parts.concat())
    }
}

/// Tag the root element with `directive` and wrap it in a `<template>`.
pub fn wrap_oob(html: &str, directive: &str) -> String {
    format!("<template>{}</template>", inject_directive(html, directive))
}

/// Add `hx-swap-oob="{directive}"` to the fragment's root element.
///
/// A no-op if the root element already carries the attribute, or if the
/// fragment contains no element at all.
pub fn inject_directive<'a>(html: &'a str, directive: &str) -> Cow<'a, str> {
    let Some(tag) = find_root_tag(html) else {
        tracing::warn!("out-of-band fragment has no root element; left untagged");
        return Cow::Borrowed(html);
    };
    if tag.has_directive {
        return Cow::Borrowed(html);
    }
    let (head, tail) = html.split_at(tag.name_end);
    Cow::Owned(format!(r#"{} {}="{}"{}"#, head, SWAP_OOB_ATTR, directive, tail))
}

/// Position of the first start tag in a fragment.
#[derive(Debug, PartialEq, Eq)]
struct RootTag {
    name_end: usize,
    has_directive: bool,
}

/// Find the first start tag, skipping text, comments, doctypes and end tags.
///
/// Attribute values are scanned quote-aware, so a `>` or `<tag` inside a
/// quoted value does not end the tag or start a new one.
fn find_root_tag(html: &str) -> Option<RootTag> {
    let bytes = html.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &html[i..];
        if rest.starts_with("<!--") {
            i += rest.find("-->")? + 3;
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") || rest.starts_with("</") {
            i += rest.find('>')? + 1;
            continue;
        }
        if !bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < bytes.len() && is_name_byte(bytes[j]) {
            j += 1;
        }
        let name_end = j;
        let has_directive = scan_attributes(html, j)?;
        return Some(RootTag {
            name_end,
            has_directive,
        });
    }
    None
}

/// Scan attributes from `start` to the closing `>`. Returns whether the
/// directive attribute is present, or `None` if the tag never closes.
fn scan_attributes(html: &str, start: usize) -> Option<bool> {
    let bytes = html.as_bytes();
    let mut j = start;
    let mut has_directive = false;

    loop {
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        match bytes.get(j)? {
            b'>' => return Some(has_directive),
            b'/' => {
                j += 1;
                continue;
            }
            _ => {}
        }

        let name_start = j;
        j += 1;
        while j < bytes.len()
            && !bytes[j].is_ascii_whitespace()
            && !matches!(bytes[j], b'=' | b'>' | b'/')
        {
            j += 1;
        }
        if html[name_start..j].eq_ignore_ascii_case(SWAP_OOB_ATTR) {
            has_directive = true;
        }

        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        match bytes.get(j)? {
            quote @ (b'"' | b'\'') => {
                let close = html[j + 1..].find(*quote as char)?;
                j += close + 2;
            }
            _ => {
                while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                    j += 1;
                }
            }
        }
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':' || b == b'_'
}
