// tests/pipeline_dedup.rs
// End-to-end pipeline behavior against canned sources and documents:
// idempotence across runs, re-emission on changed content, and the
// skip-not-fail boundary.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use edgar_13d_watch::locate::{DocumentLocator, ResolvedDocument};
use edgar_13d_watch::pipeline::run_once;
use edgar_13d_watch::seen::SeenStore;
use edgar_13d_watch::source::{FilingReference, FilingSource, FormType};
use edgar_13d_watch::{FeedMode, WatchConfig};

const MATCHING_DOC: &str = "ITEM 4. PURPOSE OF TRANSACTION\n\
The Reporting Persons entered into a merger agreement to fully acquire the Issuer.\n\
ITEM 5. INTEREST IN SECURITIES OF THE ISSUER\nirrelevant";

const AMENDED_DOC: &str = "ITEM 4. PURPOSE OF TRANSACTION\n\
The merger agreement was terminated; a tender offer buyout is now contemplated.\n\
ITEM 5. INTEREST IN SECURITIES OF THE ISSUER\nirrelevant";

const BORING_DOC: &str = "ITEM 4. PURPOSE OF TRANSACTION\n\
The shares are held for investment purposes only.\n\
ITEM 5. INTEREST IN SECURITIES OF THE ISSUER";

fn filing(id: &str, company: &str, form_type: FormType) -> FilingReference {
    FilingReference {
        identifier: id.to_string(),
        company: company.to_string(),
        form_type,
        filed_at: Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap(),
        listing_url: format!("https://www.sec.gov/Archives/edgar/data/1/{id}-index.htm"),
    }
}

struct FixedSource(Vec<FilingReference>);

#[async_trait]
impl FilingSource for FixedSource {
    async fn enumerate(&self, _lookback: Duration) -> Result<Vec<FilingReference>> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Serves one canned document body per filing identifier; `None` for
/// everything else.
struct CannedLocator(Vec<(String, String)>);

impl CannedLocator {
    fn new(docs: &[(&str, &str)]) -> Self {
        Self(
            docs.iter()
                .map(|(id, body)| (id.to_string(), body.to_string()))
                .collect(),
        )
    }
}

#[async_trait]
impl DocumentLocator for CannedLocator {
    async fn locate(&self, filing: &FilingReference) -> Option<ResolvedDocument> {
        let (_, body) = self.0.iter().find(|(id, _)| *id == filing.identifier)?;
        Some(ResolvedDocument {
            reference: filing.clone(),
            doc_url: format!("https://www.sec.gov/Archives/edgar/data/1/{}.htm", filing.identifier),
            text: body.clone(),
        })
    }
}

fn cfg() -> WatchConfig {
    WatchConfig::default()
}

#[tokio::test]
async fn second_run_with_unchanged_content_emits_nothing() {
    let sources: Vec<Box<dyn FilingSource>> =
        vec![Box::new(FixedSource(vec![filing("acc-1", "ACME CORP", FormType::New)]))];
    let locator = CannedLocator::new(&[("acc-1", MATCHING_DOC)]);
    let mut store = SeenStore::in_memory();

    let (items, summary) = run_once(&cfg(), &sources, &locator, &mut store).await;
    assert_eq!(items.len(), 1);
    assert_eq!(summary.emitted, 1);

    let (items, summary) = run_once(&cfg(), &sources, &locator, &mut store).await;
    assert!(items.is_empty());
    assert_eq!(summary.matched, 1); // still matches, suppressed by dedup
    assert_eq!(summary.emitted, 0);
}

#[tokio::test]
async fn changed_content_is_re_emitted_and_hash_updated() {
    let sources: Vec<Box<dyn FilingSource>> = vec![Box::new(FixedSource(vec![filing(
        "acc-1",
        "ACME CORP",
        FormType::Amended,
    )]))];
    let mut store = SeenStore::in_memory();

    let first = CannedLocator::new(&[("acc-1", MATCHING_DOC)]);
    let (items, _) = run_once(&cfg(), &sources, &first, &mut store).await;
    assert_eq!(items.len(), 1);

    let amended = CannedLocator::new(&[("acc-1", AMENDED_DOC)]);
    let (items, _) = run_once(&cfg(), &sources, &amended, &mut store).await;
    assert_eq!(items.len(), 1, "changed Item 4 must re-emit");
    assert!(items[0].title.starts_with("[AMENDED]"));

    // and the updated hash suppresses the next pass
    let (items, _) = run_once(&cfg(), &sources, &amended, &mut store).await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn unlocatable_and_boring_filings_are_skipped_not_fatal() {
    let sources: Vec<Box<dyn FilingSource>> = vec![Box::new(FixedSource(vec![
        filing("acc-gone", "GHOST LLC", FormType::New),
        filing("acc-boring", "QUIET FUND LP", FormType::New),
        filing("acc-hit", "ACME CORP", FormType::New),
    ]))];
    // acc-gone has no document at all; acc-boring has no keyword.
    let locator = CannedLocator::new(&[("acc-boring", BORING_DOC), ("acc-hit", MATCHING_DOC)]);
    let mut store = SeenStore::in_memory();

    let (items, summary) = run_once(&cfg(), &sources, &locator, &mut store).await;
    assert_eq!(summary.enumerated, 3);
    assert_eq!(summary.located, 2);
    assert_eq!(summary.matched, 1);
    assert_eq!(items.len(), 1);
    assert!(items[0].title.contains("ACME CORP"));
}

#[tokio::test]
async fn emitted_item_carries_highlighted_excerpt_and_backlink() {
    let sources: Vec<Box<dyn FilingSource>> =
        vec![Box::new(FixedSource(vec![filing("acc-1", "ACME CORP", FormType::New)]))];
    let locator = CannedLocator::new(&[("acc-1", MATCHING_DOC)]);
    let mut store = SeenStore::in_memory();

    let (items, _) = run_once(&cfg(), &sources, &locator, &mut store).await;
    let item = &items[0];
    assert_eq!(item.title, "[NEW] \u{1F195} SC 13D - ACME CORP");
    assert!(item.description_html.contains("<strong>merger agreement</strong>"));
    assert!(item.description_html.contains("<strong>fully acquire</strong>"));
    assert!(item.description_html.contains("View filing"));
    assert!(item.link.ends_with("acc-1.htm"));
}

struct UnreachableLocator;

#[async_trait]
impl DocumentLocator for UnreachableLocator {
    async fn locate(&self, _filing: &FilingReference) -> Option<ResolvedDocument> {
        unreachable!("firehose mode must not fetch documents");
    }
}

#[tokio::test]
async fn firehose_mode_republishes_without_document_fetches() {
    let refs = vec![
        filing("acc-1", "ACME CORP", FormType::New),
        filing("acc-2", "WIDGET INC", FormType::Amended),
    ];
    let sources: Vec<Box<dyn FilingSource>> = vec![Box::new(FixedSource(refs))];
    let mut store = SeenStore::in_memory();
    let mut cfg = cfg();
    cfg.mode = FeedMode::Firehose;

    let (items, summary) = run_once(&cfg, &sources, &UnreachableLocator, &mut store).await;
    assert_eq!(items.len(), 2);
    assert_eq!(summary.emitted, 2);
    assert!(items[1].title.starts_with("[AMENDED]"));
    assert!(items[0].link.ends_with("-index.htm"));
}
