//! The answer store: a flat key → answer mapping persisted as JSON.
//!
//! Cache key is a SHA-256 digest of the trimmed query text. Entries are
//! write-once — no TTL, no eviction, no invalidation; the first answer for
//! a given query text stands until the file is cleared by hand.
//!
//! The whole mapping lives in memory and is rewritten to disk on every
//! insert via atomic replace (write a sibling temp file, then rename), so
//! a crash mid-write can never leave a torn file behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;

/// Build a deterministic cache key: SHA-256 hex digest of the query bytes.
///
/// Callers pass the trimmed query; byte-identical text always yields the
/// identical key.
pub fn cache_key(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Capability set of the answer store, so the handler can run against any
/// key-value backing.
pub trait AnswerStore: Send + Sync {
    /// Look up a cached answer by key.
    fn get(&self, key: &str) -> Option<String>;

    /// Insert an answer and persist the full mapping.
    fn put(&mut self, key: String, answer: String) -> Result<()>;

    /// Number of entries currently held.
    fn len(&self) -> usize;

    /// True when the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// JSON-file-backed answer store.
///
/// Loads the mapping once at construction; a missing or unparseable file
/// starts the store empty rather than failing startup.
pub struct JsonFileStore {
    entries: HashMap<String, String>,
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`, loading any existing entries.
    pub fn open(path: PathBuf) -> Self {
        let entries = Self::load_from_disk(&path);
        debug!(entries = entries.len(), path = %path.display(), "Answer store loaded");
        Self { entries, path }
    }

    fn load_from_disk(path: &Path) -> HashMap<String, String> {
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Answer store file is corrupt, starting empty: {}", e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Failed to read answer store, starting empty: {}", e);
                HashMap::new()
            }
        }
    }

    /// Rewrite the full mapping to disk via atomic replace.
    fn persist_all(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl AnswerStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: String, answer: String) -> Result<()> {
        self.entries.insert(key, answer);
        self.persist_all()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
