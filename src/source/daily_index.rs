// src/source/daily_index.rs
//! Enumeration from the daily master index archive.
//!
//! One `master.YYYYMMDD.idx` per day, bucketed by quarter. The gzip variant
//! is tried first. Weekends and holidays simply have no file; a missing day
//! yields zero filings, never an error. Index fetches get the bounded retry
//! policy (individual document fetches do not).

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use flate2::read::GzDecoder;
use std::io::Read;
use std::time::Duration as StdDuration;

use crate::client::{EdgarClient, ARCHIVE_BASE};
use crate::source::{FilingReference, FilingSource, FormType};

const HEADER_MARKER: &str = "CIK|";

pub fn quarter(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

fn index_url(date: NaiveDate, gz: bool) -> String {
    let suffix = if gz { ".gz" } else { "" };
    format!(
        "{ARCHIVE_BASE}/Archives/edgar/daily-index/{}/QTR{}/master.{}.idx{suffix}",
        date.year(),
        quarter(date.month()),
        date.format("%Y%m%d"),
    )
}

fn parse_filed_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// `edgar/data/1234567/0001234567-26-000123.txt` → accession + index page URL.
fn reference_urls(path: &str) -> Option<(String, String)> {
    let path = path.trim();
    let (dir, file) = path.rsplit_once('/')?;
    let accession = file.strip_suffix(".txt")?;
    if accession.is_empty() {
        return None;
    }
    let nodash = accession.replace('-', "");
    let listing = format!("{ARCHIVE_BASE}/Archives/{dir}/{nodash}/{accession}-index.htm");
    Some((accession.to_string(), listing))
}

/// Parse one pipe-delimited master index: five columns
/// `CIK|Company Name|Form Type|Date Filed|File Name`, data rows starting
/// after the `CIK|...` header marker. Malformed rows are skipped.
pub fn parse_master_index(body: &str, cutoff: DateTime<Utc>) -> Vec<FilingReference> {
    let mut out = Vec::new();
    let mut in_data = false;
    for line in body.lines() {
        if !in_data {
            if line.starts_with(HEADER_MARKER) {
                in_data = true;
            }
            continue;
        }
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != 5 {
            continue;
        }
        let Some(form_type) = FormType::from_sec(fields[2]) else {
            continue;
        };
        let Some(filed_at) = parse_filed_date(fields[3]) else {
            continue;
        };
        if filed_at < cutoff {
            continue;
        }
        let Some((identifier, listing_url)) = reference_urls(fields[4]) else {
            continue;
        };
        out.push(FilingReference {
            identifier,
            company: fields[1].trim().to_string(),
            form_type,
            filed_at,
            listing_url,
        });
    }
    out
}

pub struct DailyIndexSource {
    client: EdgarClient,
    retry_attempts: u32,
    retry_delay: StdDuration,
}

impl DailyIndexSource {
    pub fn new(client: EdgarClient, retry_attempts: u32, retry_delay_ms: u64) -> Self {
        Self {
            client,
            retry_attempts,
            retry_delay: StdDuration::from_millis(retry_delay_ms),
        }
    }

    /// Fetch one day's index body, compressed variant first.
    async fn fetch_day(&self, date: NaiveDate) -> Option<String> {
        let gz_url = index_url(date, true);
        if let Some(bytes) = self
            .client
            .get_bytes_retry(&gz_url, self.retry_attempts, self.retry_delay)
            .await
        {
            let mut body = String::new();
            match GzDecoder::new(bytes.as_slice()).read_to_string(&mut body) {
                Ok(_) => return Some(body),
                Err(e) => {
                    tracing::warn!(url = gz_url, error = ?e, "gzip decode failed, trying plain");
                }
            }
        }

        let plain_url = index_url(date, false);
        let bytes = self
            .client
            .get_bytes_retry(&plain_url, self.retry_attempts, self.retry_delay)
            .await?;
        String::from_utf8(bytes).ok()
    }
}

#[async_trait::async_trait]
impl FilingSource for DailyIndexSource {
    async fn enumerate(&self, lookback: Duration) -> Result<Vec<FilingReference>> {
        let now = Utc::now();
        let cutoff = now - lookback;
        let days = lookback.num_days().max(1);

        let mut out = Vec::new();
        for offset in 0..days {
            let date = (now - Duration::days(offset)).date_naive();
            match self.fetch_day(date).await {
                Some(body) => {
                    let refs = parse_master_index(&body, cutoff);
                    tracing::debug!(%date, count = refs.len(), "daily index parsed");
                    out.extend(refs);
                }
                None => {
                    // Routine for weekends/holidays.
                    tracing::debug!(%date, "no daily index available");
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "daily-index"
    }
}
