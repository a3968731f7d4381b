// src/seen.rs
//! Change tracking: identifier → SHA-256 of the last-emitted section text.
//!
//! The store is the run's only durable state. It is loaded once at startup
//! (a malformed file is fatal — no auto-repair), mutated in memory, and
//! flushed once at the end via temp-file + rename so a mid-run crash never
//! leaves a partial file behind.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// SHA-256 of the UTF-8 bytes, lowercase hex.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Default)]
pub struct SeenStore {
    path: Option<PathBuf>,
    map: BTreeMap<String, String>,
}

impl SeenStore {
    /// Store without a backing file, for tests and dry runs.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the persisted mapping. A missing file is an empty store; an
    /// unparseable one is an error the caller should treat as fatal.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let map = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("corrupt seen-hash file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        Ok(Self {
            path: Some(path),
            map,
        })
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.map.get(identifier).map(String::as_str)
    }

    pub fn put(&mut self, identifier: &str, hash: String) {
        self.map.insert(identifier.to_string(), hash);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// True when `content` is new for this identifier or differs from what
    /// was last emitted; records the new hash as a side effect. An equal
    /// hash suppresses re-emission; a changed hash is an update (amendments
    /// whose Item 4 text changed get re-emitted).
    pub fn is_new_or_changed(&mut self, identifier: &str, content: &str) -> bool {
        let hash = content_hash(content);
        if self.get(identifier) == Some(hash.as_str()) {
            return false;
        }
        self.put(identifier, hash);
        true
    }

    /// Whole-file overwrite, atomic via temp file + rename.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_atomic(path, &serde_json::to_vec_pretty(&self.map)?)
            .with_context(|| format!("writing seen-hash file {}", path.display()))
    }
}

/// Write `bytes` to `path` through a sibling temp file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}
