// src/locate.rs
//! Primary-document resolution.
//!
//! A filing's index page, the filer-tool URL convention, and the full
//! submission text file each point at the primary document in a different
//! way, and no single one covers all of EDGAR. The strategies run in a
//! fixed order, first success wins. Nothing here raises past the boundary:
//! a network error, missing table, or 404 means "skip this filing" and the
//! run continues.

use scraper::{Html, Selector};
use url::Url;

use crate::client::{EdgarClient, ARCHIVE_BASE};
use crate::source::FilingReference;

/// A filing reference with its primary document fetched. Ephemeral.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    pub reference: FilingReference,
    pub doc_url: String,
    pub text: String,
}

/// Seam for the pipeline: tests inject canned documents, production uses
/// [`EdgarLocator`].
#[async_trait::async_trait]
pub trait DocumentLocator: Send + Sync {
    async fn locate(&self, filing: &FilingReference) -> Option<ResolvedDocument>;
}

pub struct EdgarLocator {
    client: EdgarClient,
}

impl EdgarLocator {
    pub fn new(client: EdgarClient) -> Self {
        Self { client }
    }

    async fn fetch_ok(&self, url: &str) -> Option<String> {
        match self.client.get_text_ok(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url, error = ?e, "document fetch failed");
                None
            }
        }
    }

    /// Strategy 1: scrape the index page's document table.
    async fn try_index_table(&self, filing: &FilingReference) -> Option<String> {
        let html = self.fetch_ok(&filing.listing_url).await?;
        primary_doc_href(&html)
    }

    /// Strategy 2: rewrite the index URL to the filer-tool primary document
    /// path and probe it. Returns the body too, saving a second fetch.
    async fn try_primary_doc_guess(&self, filing: &FilingReference) -> Option<(String, String)> {
        let url = primary_doc_guess(&filing.listing_url)?;
        let body = self.fetch_ok(&url).await?;
        Some((url, body))
    }

    /// Strategy 3: scan the full submission text for the embedded filename
    /// marker and join it onto the submission directory.
    async fn try_submission_scan(&self, filing: &FilingReference) -> Option<String> {
        let submission_url = submission_text_url(&filing.listing_url)?;
        let body = self.fetch_ok(&submission_url).await?;
        let filename = embedded_filename(&body)?;
        let (dir, _) = filing.listing_url.rsplit_once('/')?;
        Some(format!("{dir}/{filename}"))
    }
}

#[async_trait::async_trait]
impl DocumentLocator for EdgarLocator {
    async fn locate(&self, filing: &FilingReference) -> Option<ResolvedDocument> {
        if let Some(url) = self.try_index_table(filing).await {
            if let Some(text) = self.fetch_ok(&url).await {
                return Some(ResolvedDocument {
                    reference: filing.clone(),
                    doc_url: url,
                    text,
                });
            }
        }
        if let Some((url, text)) = self.try_primary_doc_guess(filing).await {
            return Some(ResolvedDocument {
                reference: filing.clone(),
                doc_url: url,
                text,
            });
        }
        if let Some(url) = self.try_submission_scan(filing).await {
            if let Some(text) = self.fetch_ok(&url).await {
                return Some(ResolvedDocument {
                    reference: filing.clone(),
                    doc_url: url,
                    text,
                });
            }
        }
        tracing::debug!(id = %filing.identifier, "no primary document found");
        None
    }
}

/// Pick the primary document link out of a filing index page: first row of
/// the document table whose type column starts with `SC 13D`, link resolved
/// against the archive base.
pub fn primary_doc_href(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let table_sel = Selector::parse("table.tableFile").ok()?;
    let row_sel = Selector::parse("tr").ok()?;
    let cell_sel = Selector::parse("td").ok()?;
    let link_sel = Selector::parse("a").ok()?;

    let table = doc.select(&table_sel).next()?;
    for row in table.select(&row_sel) {
        // seq | description | document link | type | size
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() < 4 {
            continue;
        }
        let doc_type: String = cells[3].text().collect();
        if !doc_type.trim().starts_with("SC 13D") {
            continue;
        }
        if let Some(href) = cells[2]
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            return Some(resolve_archive_url(href));
        }
    }
    None
}

/// Absolute URL against the SEC archive base; already-absolute links pass
/// through.
pub fn resolve_archive_url(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match Url::parse(ARCHIVE_BASE).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{ARCHIVE_BASE}{href}"),
    }
}

/// Filer-tool convention: `<dir>/<accession>-index.htm` filings keep their
/// machine-readable primary document at `<dir>/primary_doc.xml`.
pub fn primary_doc_guess(listing_url: &str) -> Option<String> {
    if !listing_url.ends_with("-index.htm") && !listing_url.ends_with("-index.html") {
        return None;
    }
    let (dir, _) = listing_url.rsplit_once('/')?;
    Some(format!("{dir}/primary_doc.xml"))
}

/// `<dir>/<accession>-index.htm` → `<dir>/<accession>.txt` (the full
/// submission text file).
pub fn submission_text_url(listing_url: &str) -> Option<String> {
    let stem = listing_url
        .strip_suffix("-index.htm")
        .or_else(|| listing_url.strip_suffix("-index.html"))?;
    Some(format!("{stem}.txt"))
}

/// First `<FILENAME>` marker in a full submission text file.
pub fn embedded_filename(submission: &str) -> Option<String> {
    for line in submission.lines() {
        if let Some(rest) = line.trim_start().strip_prefix("<FILENAME>") {
            let name = rest.trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}
