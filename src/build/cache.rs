//! Rendered-post cache.
//!
//! Entries are keyed by slug (the post's directory name) and carry the
//! source modification time they were rendered from. An entry is valid if
//! and only if its stored mtime is non-zero and not older than the source,
//! and it was rendered under the same settings
//! ([`SiteConfig::render_fingerprint`](crate::config::SiteConfig::render_fingerprint)).

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
    time::UNIX_EPOCH,
};

use anyhow::{Context, Result};

use crate::post::{Post, PostMeta};

/// One cached rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub html: String,
    pub tldr: Option<String>,
    pub metadata: PostMeta,
    /// Source mtime in milliseconds since the epoch.
    pub mtime: u64,
    /// First code-group id handed to this post.
    #[serde(default)]
    pub id_base: u32,
    /// Fingerprint of the rendering settings.
    #[serde(default)]
    pub config: String,
}

impl CacheEntry {
    pub fn new(post: &Post, mtime: u64, id_base: u32, config: &str) -> Self {
        Self {
            html: post.html.clone(),
            tldr: post.tldr.clone(),
            metadata: post.metadata.clone(),
            mtime,
            id_base,
            config: config.to_string(),
        }
    }

    /// Whether this entry still matches a source with `source_mtime`.
    pub fn is_fresh(&self, source_mtime: u64) -> bool {
        self.mtime != 0 && self.mtime >= source_mtime
    }

    pub fn into_post(self, source: PathBuf) -> Post {
        Post {
            html: self.html,
            tldr: self.tldr,
            metadata: self.metadata,
            source,
        }
    }
}

/// Key-value store of rendered posts.
pub trait PostCache: Send + Sync {
    fn get(&self, slug: &str) -> Option<CacheEntry>;
    fn put(&self, slug: &str, entry: CacheEntry);
}

/// Cache that never hits. Used with `--no-cache`.
#[derive(Debug, Default)]
pub struct NoCache;

impl PostCache for NoCache {
    fn get(&self, _slug: &str) -> Option<CacheEntry> {
        None
    }

    fn put(&self, _slug: &str, _entry: CacheEntry) {}
}

/// Cache persisted as one JSON file.
#[derive(Debug)]
pub struct JsonCache {
    path: PathBuf,
    entries: Mutex<FxHashMap<String, CacheEntry>>,
    dirty: AtomicBool,
}

impl JsonCache {
    /// Load the cache file. A missing or unreadable file starts empty.
    pub fn load(path: &Path) -> Self {
        let entries = fs::read_to_string(path)
            .ok()
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(entries) => Some(entries),
                Err(err) => {
                    crate::debug!("cache"; "discarding {}: {err}", path.display());
                    None
                }
            })
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the cache back if anything changed.
    pub fn save(&self) -> Result<()> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string(&*self.entries.lock())?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write cache {}", self.path.display()))
    }
}

impl PostCache for JsonCache {
    fn get(&self, slug: &str) -> Option<CacheEntry> {
        self.entries.lock().get(slug).cloned()
    }

    fn put(&self, slug: &str, entry: CacheEntry) {
        self.entries.lock().insert(slug.to_string(), entry);
        self.dirty.store(true, Ordering::SeqCst);
    }
}

/// Modification time in milliseconds, 0 when unknown.
pub fn mtime_millis(path: &Path) -> u64 {
    path.metadata()
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(0)
}
