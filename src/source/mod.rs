// src/source/mod.rs
//! Filing sources: enumerate candidate 13D/13D-A filings for a lookback window.

pub mod current_feed;
pub mod daily_index;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

/// The two target form types. Everything else EDGAR publishes is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormType {
    New,
    Amended,
}

impl FormType {
    /// Exact-match mapping from the SEC form-type column.
    pub fn from_sec(s: &str) -> Option<Self> {
        match s.trim() {
            "SC 13D" => Some(FormType::New),
            "SC 13D/A" => Some(FormType::Amended),
            _ => None,
        }
    }

    pub fn sec_name(&self) -> &'static str {
        match self {
            FormType::New => "SC 13D",
            FormType::Amended => "SC 13D/A",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormType::New => "NEW",
            FormType::Amended => "AMENDED",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            FormType::New => "\u{1F195}",  // 🆕
            FormType::Amended => "\u{267B}\u{FE0F}", // ♻️
        }
    }
}

/// One candidate filing from an enumeration pass. Immutable; dropped after
/// the filing is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct FilingReference {
    /// Accession number, e.g. `0001234567-26-000123`. Stable across runs;
    /// this is the dedup key.
    pub identifier: String,
    pub company: String,
    pub form_type: FormType,
    pub filed_at: DateTime<Utc>,
    /// Filing index (detail) page URL.
    pub listing_url: String,
}

#[async_trait::async_trait]
pub trait FilingSource: Send + Sync {
    async fn enumerate(&self, lookback: Duration) -> Result<Vec<FilingReference>>;
    fn name(&self) -> &'static str;
}
