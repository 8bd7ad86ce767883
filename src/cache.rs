//! Disk cache for raw API responses.
//!
//! A full-season fetch is a few hundred requests; caching the raw JSON
//! bodies makes reruns free during development and keeps the pipeline
//! rerunnable without burning API quota. Entries are keyed by endpoint path
//! plus query parameters, hashed to a file name. A corrupt or unreadable
//! entry is ignored and the request refetched.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// File-backed cache of JSON response bodies.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Open (and create if needed) a cache under `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Look up a cached response. Returns None on miss or on an entry that
    /// no longer parses.
    pub fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(value) => {
                debug!(key, path = %path.display(), "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "discarding unparseable cache entry");
                None
            }
        }
    }

    /// Store a response body. Cache write failures are logged, not fatal —
    /// the fetched value is still usable.
    pub fn put(&self, key: &str, value: &Value) {
        let path = self.entry_path(key);
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(key, error = %e, "failed to write cache entry");
                }
            }
            Err(e) => warn!(key, error = %e, "failed to serialize cache entry"),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.dir.join(format!("{:016x}.json", hasher.finish()))
    }
}

/// Build a cache key from an endpoint path and its query parameters.
pub fn cache_key(path: &str, params: &[(&str, String)]) -> String {
    let mut key = path.to_string();
    for (name, value) in params {
        key.push_str(&format!("&{}={}", name, value));
    }
    key
}
