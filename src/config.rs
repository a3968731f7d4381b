// src/config.rs
//! Run configuration: fixed in-code defaults with an optional TOML overlay.
//!
//! Resolution order:
//! 1) `$WATCH_CONFIG_PATH` (must exist if set)
//! 2) `config/watch.toml`
//! 3) built-in defaults
//!
//! `EDGAR_USER_AGENT` overrides the user agent in any case — the SEC requires
//! a contact address in it, so deployments set it via `.env`.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::keywords::DEFAULT_KEYWORDS;

pub const ENV_CONFIG_PATH: &str = "WATCH_CONFIG_PATH";
pub const ENV_USER_AGENT: &str = "EDGAR_USER_AGENT";
const DEFAULT_CONFIG_PATH: &str = "config/watch.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The browse-edgar "recently filed" Atom listing.
    Current,
    /// Per-day master index files from the daily-index archive.
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Full pipeline: locate, extract Item 4, keyword-gate, dedup.
    Filtered,
    /// Republish every enumerated filing in the window, no document fetches.
    Firehose,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    pub user_agent: String,
    pub lookback_days: i64,
    /// Fair-access delay enforced before every outbound request.
    pub request_delay_ms: u64,
    pub index_retry_attempts: u32,
    pub index_retry_delay_ms: u64,
    pub max_feed_items: usize,
    pub keywords: Vec<String>,
    pub feed_path: PathBuf,
    pub state_path: PathBuf,
    pub source: SourceKind,
    pub mode: FeedMode,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            user_agent: "edgar-13d-watch/0.1 (contact: ops@example.com)".to_string(),
            lookback_days: 7,
            request_delay_ms: 1_000,
            index_retry_attempts: 3,
            index_retry_delay_ms: 2_000,
            max_feed_items: 50,
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            feed_path: PathBuf::from("feed.xml"),
            state_path: PathBuf::from("state/seen_item4.json"),
            source: SourceKind::Current,
            mode: FeedMode::Filtered,
        }
    }
}

pub fn load_from(path: &Path) -> Result<WatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let cfg: WatchConfig =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

pub fn load_default() -> Result<WatchConfig> {
    let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        load_from(&pb)?
    } else {
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            load_from(&default_p)?
        } else {
            WatchConfig::default()
        }
    };

    if let Ok(ua) = std::env::var(ENV_USER_AGENT) {
        if !ua.trim().is_empty() {
            cfg.user_agent = ua;
        }
    }
    Ok(cfg)
}
