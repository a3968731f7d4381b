// src/text.rs
//! Plain-text rendering of EDGAR documents (HTML, XML, legacy SGML).
//!
//! Filings are wildly inconsistent: modern submissions are XHTML, older ones
//! are SGML with bare tags, the oldest are plain text. We only need a text
//! view good enough for section-boundary regexes, so this stays deliberately
//! simple: block-level tags become newlines, everything else is stripped,
//! entities are decoded last.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Render markup to plain text, preserving line structure.
pub fn html_to_text(s: &str) -> String {
    // 1) Block-level boundaries become newlines so headers stay on their own lines.
    static RE_BLOCK: OnceCell<Regex> = OnceCell::new();
    let re_block = RE_BLOCK.get_or_init(|| {
        Regex::new(r"(?i)<\s*(?:br\s*/?|/p|/div|/tr|/td|/th|/li|/h[1-6]|/table|/blockquote)\s*>")
            .unwrap()
    });
    let mut out = re_block.replace_all(s, "\n").to_string();

    // 2) Strip remaining tags (covers SGML markers like <PAGE> too).
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-zA-Z][^>]*>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Entity decode after tag removal, so decoded '<' cannot form new tags.
    out = html_escape::decode_html_entities(&out).to_string();
    out = out.replace('\u{00A0}', " ");

    // 4) Collapse horizontal whitespace per line, drop blank-line runs.
    static RE_HWS: OnceCell<Regex> = OnceCell::new();
    let re_hws = RE_HWS.get_or_init(|| Regex::new(r"[ \t\r\f]+").unwrap());
    let mut lines: Vec<String> = Vec::new();
    let mut last_blank = true;
    for line in out.lines() {
        let line = re_hws.replace_all(line, " ");
        let line = line.trim();
        if line.is_empty() {
            if !last_blank {
                lines.push(String::new());
            }
            last_blank = true;
        } else {
            lines.push(line.to_string());
            last_blank = false;
        }
    }
    lines.join("\n").trim().to_string()
}

/// Collapse all whitespace runs to single spaces and trim.
pub fn collapse_ws(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}
