// src/source/current_feed.rs
//! "Recently filed" listing via the browse-edgar Atom feed.
//!
//! One request per target form type; entries carry everything we need
//! (title, index-page link, timestamp, accession number) with no document
//! fetch at this stage.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::client::{EdgarClient, ARCHIVE_BASE};
use crate::source::{FilingReference, FilingSource, FormType};

const FORM_TYPES: [FormType; 2] = [FormType::New, FormType::Amended];
const PER_FEED_COUNT: usize = 100;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    link: Option<AtomLink>,
    updated: Option<String>,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
}

fn listing_url(form: FormType) -> String {
    let encoded = form.sec_name().replace(' ', "%20").replace('/', "%2F");
    format!(
        "{ARCHIVE_BASE}/cgi-bin/browse-edgar?action=getcurrent&type={encoded}&owner=include&count={PER_FEED_COUNT}&output=atom"
    )
}

/// Company name out of an entry title like
/// `SC 13D/A - ACME CORP (0001234567) (Subject)`.
fn company_from_title(title: &str) -> Option<String> {
    let (_, rest) = title.split_once(" - ")?;
    let name = rest.split(" (").next().unwrap_or(rest).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Accession number from an entry id like
/// `urn:tag:sec.gov,2008:accession-number=0001234567-26-000123`.
fn accession_from_id(id: &str) -> Option<String> {
    let (_, acc) = id.split_once("accession-number=")?;
    let acc = acc.trim();
    if acc.is_empty() {
        None
    } else {
        Some(acc.to_string())
    }
}

/// Parse one Atom listing document into filing references. Entries missing a
/// required field are skipped, not errors.
pub fn parse_atom_listing(xml: &str) -> Result<Vec<FilingReference>> {
    let feed: AtomFeed = from_str(xml).context("parsing browse-edgar atom listing")?;

    let mut out = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let Some(title) = entry.title.as_deref() else {
            continue;
        };
        // Amended first: "SC 13D" is a prefix of "SC 13D/A".
        let form_type = if title.starts_with("SC 13D/A") {
            FormType::Amended
        } else if title.starts_with("SC 13D") {
            FormType::New
        } else {
            continue;
        };
        let Some(company) = company_from_title(title) else {
            continue;
        };
        let Some(link) = entry.link.as_ref().and_then(|l| l.href.clone()) else {
            continue;
        };
        let Some(filed_at) = entry
            .updated
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
        else {
            tracing::debug!(title, "entry without a parseable timestamp, skipped");
            continue;
        };
        let identifier = entry
            .id
            .as_deref()
            .and_then(accession_from_id)
            .unwrap_or_else(|| link.clone());

        out.push(FilingReference {
            identifier,
            company,
            form_type,
            filed_at,
            listing_url: link,
        });
    }
    Ok(out)
}

pub struct CurrentFeedSource {
    client: EdgarClient,
}

impl CurrentFeedSource {
    pub fn new(client: EdgarClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl FilingSource for CurrentFeedSource {
    async fn enumerate(&self, lookback: Duration) -> Result<Vec<FilingReference>> {
        let cutoff = Utc::now() - lookback;
        let mut out = Vec::new();
        for form in FORM_TYPES {
            let url = listing_url(form);
            let body = match self.client.get_text(&url).await {
                Ok(b) => b,
                Err(e) => {
                    // One listing failing must not sink the other.
                    tracing::warn!(form = form.sec_name(), error = ?e, "listing fetch failed");
                    continue;
                }
            };
            match parse_atom_listing(&body) {
                Ok(refs) => out.extend(refs.into_iter().filter(|r| r.filed_at >= cutoff)),
                Err(e) => {
                    tracing::warn!(form = form.sec_name(), error = ?e, "listing parse failed");
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "current-feed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" ?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Latest Filings - Thu, 27 Aug 2026 12:00:00 EDT</title>
  <entry>
    <title>SC 13D/A - ACME HOLDINGS CORP (0000123456) (Subject)</title>
    <link rel="alternate" type="text/html" href="https://www.sec.gov/Archives/edgar/data/123456/000112233426000015/0001122334-26-000015-index.htm"/>
    <summary type="html">&lt;b&gt;Filed:&lt;/b&gt; 2026-08-27</summary>
    <updated>2026-08-27T16:03:21-04:00</updated>
    <id>urn:tag:sec.gov,2008:accession-number=0001122334-26-000015</id>
  </entry>
  <entry>
    <title>SC 13D - WIDGET INDUSTRIES INC (0000987654) (Subject)</title>
    <link rel="alternate" type="text/html" href="https://www.sec.gov/Archives/edgar/data/987654/000099887726000044/0000998877-26-000044-index.htm"/>
    <updated>2026-08-27T15:11:02-04:00</updated>
    <id>urn:tag:sec.gov,2008:accession-number=0000998877-26-000044</id>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_with_form_and_accession() {
        let refs = parse_atom_listing(SAMPLE).unwrap();
        assert_eq!(refs.len(), 2);

        assert_eq!(refs[0].form_type, FormType::Amended);
        assert_eq!(refs[0].company, "ACME HOLDINGS CORP");
        assert_eq!(refs[0].identifier, "0001122334-26-000015");
        assert!(refs[0].listing_url.ends_with("-index.htm"));

        assert_eq!(refs[1].form_type, FormType::New);
        assert_eq!(refs[1].company, "WIDGET INDUSTRIES INC");
    }

    #[test]
    fn non_13d_entries_are_skipped() {
        let xml = SAMPLE.replace("SC 13D - WIDGET", "SC 13G - WIDGET");
        let refs = parse_atom_listing(&xml).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].form_type, FormType::Amended);
    }

    #[test]
    fn listing_url_encodes_the_form_type() {
        assert!(listing_url(FormType::Amended).contains("type=SC%2013D%2FA"));
    }
}
