// tests/current_feed_fixture.rs
// Parse a captured browse-edgar Atom listing shape end to end.

use chrono::{TimeZone, Utc};
use edgar_13d_watch::source::current_feed::parse_atom_listing;
use edgar_13d_watch::source::FormType;

const FIXTURE: &str = include_str!("fixtures/current_feed.xml");

#[test]
fn fixture_parses_both_target_forms_and_skips_13g() {
    let refs = parse_atom_listing(FIXTURE).unwrap();
    assert_eq!(refs.len(), 2);

    let amended = &refs[0];
    assert_eq!(amended.form_type, FormType::Amended);
    assert_eq!(amended.company, "ACME HOLDINGS CORP");
    assert_eq!(amended.identifier, "0001122334-26-000015");
    assert_eq!(
        amended.listing_url,
        "https://www.sec.gov/Archives/edgar/data/123456/000112233426000015/0001122334-26-000015-index.htm"
    );
    // 16:03:21 EDT is 20:03:21 UTC
    assert_eq!(
        amended.filed_at,
        Utc.with_ymd_and_hms(2026, 8, 27, 20, 3, 21).unwrap()
    );

    let new = &refs[1];
    assert_eq!(new.form_type, FormType::New);
    assert_eq!(new.company, "WIDGET INDUSTRIES INC");
    assert_eq!(new.identifier, "0000998877-26-000044");
}
