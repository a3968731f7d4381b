// src/client.rs
//! Rate-limited EDGAR HTTP client.
//!
//! The SEC's fair-access policy asks for a declared user agent and a modest
//! request rate, so every fetch goes through this wrapper: one shared
//! `reqwest::Client`, a fixed sleep before each request, no concurrency.

use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const ARCHIVE_BASE: &str = "https://www.sec.gov";

#[derive(Debug, Clone)]
pub struct EdgarClient {
    http: reqwest::Client,
    delay: Duration,
}

impl EdgarClient {
    pub fn new(user_agent: &str, delay_ms: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            delay: Duration::from_millis(delay_ms),
        })
    }

    async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// GET returning the body; any non-success status is an error.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        match self.get_text_ok(url).await? {
            Some(body) => Ok(body),
            None => bail!("GET {url} returned a non-success status"),
        }
    }

    /// GET returning `Ok(None)` for non-success statuses (404s are routine on
    /// EDGAR: weekend index files, guessed document paths).
    pub async fn get_text_ok(&self, url: &str) -> Result<Option<String>> {
        self.pace().await;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            tracing::debug!(url, status = %resp.status(), "non-success response");
            return Ok(None);
        }
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(Some(body))
    }

    /// Byte-level variant of [`get_text_ok`](Self::get_text_ok), for gzip payloads.
    pub async fn get_bytes_ok(&self, url: &str) -> Result<Option<Vec<u8>>> {
        self.pace().await;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            tracing::debug!(url, status = %resp.status(), "non-success response");
            return Ok(None);
        }
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(Some(body.to_vec()))
    }

    /// Bounded retry for index fetches: transport errors are retried with a
    /// fixed sleep, a clean non-success status is not (the file is absent).
    pub async fn get_bytes_retry(
        &self,
        url: &str,
        attempts: u32,
        backoff: Duration,
    ) -> Option<Vec<u8>> {
        for attempt in 1..=attempts.max(1) {
            match self.get_bytes_ok(url).await {
                Ok(opt) => return opt,
                Err(e) => {
                    tracing::warn!(url, attempt, error = ?e, "index fetch failed");
                    if attempt < attempts {
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }
        None
    }
}
