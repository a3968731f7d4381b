// src/pipeline.rs
//! The run itself: sources → references → locate → extract → keyword gate →
//! highlight → dedup → feed items.
//!
//! Strictly sequential. Every per-filing failure is caught at this boundary
//! and becomes a logged skip; only state load and output writes (handled by
//! the binary) can kill a run.

use chrono::Duration;

use crate::config::{FeedMode, WatchConfig};
use crate::extract::extract_item4;
use crate::feed::FeedItem;
use crate::keywords::{highlight_term, KeywordSet};
use crate::locate::{DocumentLocator, ResolvedDocument};
use crate::seen::SeenStore;
use crate::source::{FilingReference, FilingSource};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub enumerated: usize,
    pub located: usize,
    pub extracted: usize,
    pub matched: usize,
    pub emitted: usize,
}

fn item_title(filing: &FilingReference) -> String {
    format!(
        "[{}] {} {} - {}",
        filing.form_type.label(),
        filing.form_type.icon(),
        filing.form_type.sec_name(),
        filing.company,
    )
}

fn filtered_item(doc: &ResolvedDocument, highlighted: String) -> FeedItem {
    let filing = &doc.reference;
    FeedItem {
        title: item_title(filing),
        link: doc.doc_url.clone(),
        description_html: format!(
            "{highlighted}<p><a href=\"{}\">View filing</a></p>",
            doc.doc_url
        ),
        published: filing.filed_at,
    }
}

fn firehose_item(filing: &FilingReference) -> FeedItem {
    FeedItem {
        title: item_title(filing),
        link: filing.listing_url.clone(),
        description_html: format!("<a href=\"{}\">View filing</a>", filing.listing_url),
        published: filing.filed_at,
    }
}

/// One full pass. The caller owns flushing the store and writing the feed.
pub async fn run_once(
    cfg: &WatchConfig,
    sources: &[Box<dyn FilingSource>],
    locator: &dyn DocumentLocator,
    store: &mut SeenStore,
) -> (Vec<FeedItem>, RunSummary) {
    let lookback = Duration::days(cfg.lookback_days);
    let mut summary = RunSummary::default();
    let mut references: Vec<FilingReference> = Vec::new();

    for source in sources {
        match source.enumerate(lookback).await {
            Ok(refs) => {
                tracing::info!(source = source.name(), count = refs.len(), "enumerated");
                references.extend(refs);
            }
            Err(e) => {
                tracing::warn!(source = source.name(), error = ?e, "source failed");
            }
        }
    }
    summary.enumerated = references.len();

    if cfg.mode == FeedMode::Firehose {
        let items: Vec<FeedItem> = references.iter().map(firehose_item).collect();
        summary.emitted = items.len();
        return (items, summary);
    }

    let keyword_set = KeywordSet::new(&cfg.keywords);
    let mut items = Vec::new();

    for filing in &references {
        let Some(doc) = locator.locate(filing).await else {
            tracing::debug!(id = %filing.identifier, "skipped: no primary document");
            continue;
        };
        summary.located += 1;

        let Some(section) = extract_item4(&doc.text) else {
            tracing::debug!(id = %filing.identifier, "skipped: no Item 4 section");
            continue;
        };
        summary.extracted += 1;

        if !keyword_set.matches(&section) {
            tracing::debug!(id = %filing.identifier, "skipped: no keyword match");
            continue;
        }
        summary.matched += 1;

        // Dedup hashes the canonical section text; highlighting is
        // presentation-only and cannot invalidate the history.
        if !store.is_new_or_changed(&filing.identifier, &section) {
            tracing::debug!(id = %filing.identifier, "skipped: content unchanged");
            continue;
        }

        let highlighted = highlight_term(&keyword_set.highlight(&section), &filing.company);
        items.push(filtered_item(&doc, highlighted));
        summary.emitted += 1;
    }

    (items, summary)
}
