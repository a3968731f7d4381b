// src/keywords.rs
//! Keyword matching and highlight markup.
//!
//! Keywords are escaped literals matched case-insensitively; a filing
//! qualifies when any of them appears. Highlighting collects all match
//! spans against the original text, merges overlaps, and emits
//! `<strong>` markup in a single pass, so inserted markup is never
//! re-matched by a later keyword.

use once_cell::sync::OnceCell;
use regex::{Regex, RegexBuilder};

/// Acquisition/buyout language worth alerting on.
pub const DEFAULT_KEYWORDS: [&str; 8] = [
    "100%",
    "100 %",
    "all shares",
    "fully acquire",
    "buyout",
    "takeover",
    "converted",
    "merger agreement",
];

const MARK_OPEN: &str = "<strong>";
const MARK_CLOSE: &str = "</strong>";

#[derive(Debug)]
pub struct KeywordSet {
    patterns: Vec<Regex>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = keywords
            .into_iter()
            .filter(|k| !k.as_ref().trim().is_empty())
            .map(|k| {
                RegexBuilder::new(&regex::escape(k.as_ref()))
                    .case_insensitive(true)
                    .build()
                    .expect("escaped literal is always a valid pattern")
            })
            .collect();
        Self { patterns }
    }

    pub fn default_set() -> &'static KeywordSet {
        static SET: OnceCell<KeywordSet> = OnceCell::new();
        SET.get_or_init(|| KeywordSet::new(DEFAULT_KEYWORDS))
    }

    /// Does any keyword occur in `text`?
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Byte spans of every keyword occurrence, merged where they overlap
    /// or touch, in ascending order.
    fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = Vec::new();
        for p in &self.patterns {
            for m in p.find_iter(text) {
                spans.push((m.start(), m.end()));
            }
        }
        merge_spans(spans)
    }

    /// Wrap every keyword occurrence in emphasis markup.
    pub fn highlight(&self, text: &str) -> String {
        wrap_spans(text, &self.spans(text))
    }
}

/// One-off highlight pass for a single literal term (the filing's company
/// name gets its own independent pass).
pub fn highlight_term(text: &str, term: &str) -> String {
    if term.trim().is_empty() {
        return text.to_string();
    }
    KeywordSet::new([term]).highlight(text)
}

fn merge_spans(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = (*last_end).max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn wrap_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * (MARK_OPEN.len() + MARK_CLOSE.len()));
    let mut cursor = 0;
    for &(start, end) in spans {
        out.push_str(&text[cursor..start]);
        out.push_str(MARK_OPEN);
        out.push_str(&text[start..end]);
        out.push_str(MARK_CLOSE);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_is_case_insensitive() {
        let set = KeywordSet::default_set();
        assert!(set.matches("This is a BUYOUT offer"));
        assert!(set.matches("signed a Merger Agreement today"));
        assert!(!set.matches("no relevant terms here"));
    }

    #[test]
    fn keywords_are_literals_not_regexes() {
        // "100%" would be an invalid/odd pattern unescaped; "100 %" must not
        // match "100x%".
        let set = KeywordSet::new(["100%", "100 %"]);
        assert!(set.matches("owns 100% of the shares"));
        assert!(set.matches("owns 100 % of the shares"));
        assert!(!set.matches("owns 10 0% of the shares"));
    }

    #[test]
    fn highlight_wraps_every_occurrence() {
        let set = KeywordSet::new(["buyout"]);
        assert_eq!(
            set.highlight("A buyout is a BUYOUT."),
            "A <strong>buyout</strong> is a <strong>BUYOUT</strong>."
        );
    }

    #[test]
    fn overlapping_keywords_produce_one_clean_span() {
        // "merger agreement" and "agreement" overlap; the merged span is
        // wrapped exactly once, no nested markup.
        let set = KeywordSet::new(["merger agreement", "agreement"]);
        let out = set.highlight("the merger agreement was signed");
        assert_eq!(out, "the <strong>merger agreement</strong> was signed");
    }

    #[test]
    fn adjacent_spans_are_merged() {
        let set = KeywordSet::new(["fully ", "acquire"]);
        let out = set.highlight("to fully acquire the issuer");
        assert_eq!(out, "to <strong>fully acquire</strong> the issuer");
    }

    #[test]
    fn company_name_pass_is_independent() {
        let text = "ACME CORP announced a buyout";
        let highlighted = KeywordSet::default_set().highlight(text);
        let out = highlight_term(&highlighted, "ACME CORP");
        assert_eq!(
            out,
            "<strong>ACME CORP</strong> announced a <strong>buyout</strong>"
        );
    }

    #[test]
    fn empty_term_is_a_no_op() {
        assert_eq!(highlight_term("text", "  "), "text");
    }
}
