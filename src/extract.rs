// src/extract.rs
//! Item 4 ("Purpose of Transaction") extraction.
//!
//! Filings are not uniformly structured: submissions built with the online
//! filer tool carry a tagged XML region, older ones are SGML/plain text with
//! bare `ITEM 4.` headers. The strategies below run in order, first
//! non-empty match wins; neither matching is a normal outcome (the filing is
//! skipped), not an error.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::text::html_to_text;

/// Opening/closing tag around the Item 4 region in XML primary documents.
/// Tolerant of separators between "item" and "4" (`<item4>`, `<Item_4>`,
/// `<ITEM-4>`, plus suffixed names like `<item4PurposeOfTransaction>`).
fn re_tagged() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<\s*item[\s_\-]*4[a-z0-9_]*[^>]*>(.*?)</\s*item[\s_\-]*4[^>]*>").unwrap()
    })
}

/// Plain-text section header. The punctuation class between "4" and
/// "PURPOSE" covers periods, colons, ASCII hyphens and the Unicode en/em
/// dashes that show up in word-processor-generated filings.
fn re_header() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)ITEM\s+4[.\-–—:\s]*PURPOSE\s+OF\s+TRANSACTION").unwrap())
}

/// The next item's header terminates the section.
fn re_next_item() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)ITEM\s+5[.\-–—:\s]").unwrap())
}

/// Extract the Item 4 section from a raw primary document, or `None` if no
/// strategy finds it.
pub fn extract_item4(raw: &str) -> Option<String> {
    if let Some(section) = try_tagged(raw) {
        return Some(section);
    }
    try_header_text(&html_to_text(raw))
}

/// Strategy 1: tagged markup region, run against the raw document so the
/// tags are still visible. Inner markup is rendered to text.
fn try_tagged(raw: &str) -> Option<String> {
    let caps = re_tagged().captures(raw)?;
    let inner = html_to_text(caps.get(1).map_or("", |m| m.as_str()));
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Strategy 2: header/boundary text patterns on the tag-stripped document.
/// The section runs from the end of the `ITEM 4` header to the next
/// `ITEM 5` header, or to end of document when there is none.
fn try_header_text(text: &str) -> Option<String> {
    let start = re_header().find(text)?;
    let tail = &text[start.end()..];
    let body = match re_next_item().find(tail) {
        Some(next) => &tail[..next.start()],
        None => tail,
    };
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
