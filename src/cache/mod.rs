//! Bundle cache for Stevedore
//!
//! Maps a distribution tag to a locally materialized bundle definition.
//! Entries are content-derived and append-only: once a tag is stored it is
//! reused until someone removes it by hand.
//!
//! Different tags never share a directory, so callers resolving different
//! tags concurrently never contend. For the same tag the last writer wins,
//! and because `bundle.json` is published by rename a concurrent
//! [`BundleCache::find_bundle`] sees either the old or the new definition,
//! never a partial one.

mod paths;
mod stats;

use std::path::{Path, PathBuf};

use crate::bundle::Bundle;
use crate::common::fs::{ensure_writable_dir, write_atomic};
use crate::error::{Result, cache};

pub use paths::{BUNDLE_FILE, TAG_FILE, entry_bundle_path, tag_key};
pub use stats::{CacheEntry, CacheStats, list_entries};

/// Contract between the orchestrator and a bundle cache
pub trait BundleCache: Send + Sync {
    /// Look up the artifact stored for `tag`; `Ok(None)` on a miss
    fn find_bundle(&self, tag: &str) -> Result<Option<PathBuf>>;

    /// Persist `bundle` under `tag` and return the artifact path
    fn store_bundle(&self, tag: &str, bundle: &Bundle) -> Result<PathBuf>;

    /// Root directory of the cache, created if needed
    fn cache_dir(&self) -> Result<PathBuf>;
}

/// Bundle cache on the local file system
#[derive(Debug, Clone)]
pub struct FsBundleCache {
    root: PathBuf,
}

impl FsBundleCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BundleCache for FsBundleCache {
    fn find_bundle(&self, tag: &str) -> Result<Option<PathBuf>> {
        let path = entry_bundle_path(&self.root, tag);
        if path.is_file() {
            tracing::debug!(tag, path = %path.display(), "bundle cache hit");
            Ok(Some(path))
        } else {
            tracing::debug!(tag, "bundle cache miss");
            Ok(None)
        }
    }

    fn store_bundle(&self, tag: &str, bundle: &Bundle) -> Result<PathBuf> {
        let entry = paths::entry_dir(&self.root, tag);
        let path = entry.join(BUNDLE_FILE);

        let content = bundle.to_json().map_err(|e| {
            cache::operation_failed(format!("Failed to serialize bundle for tag '{tag}': {e}"))
        })?;

        write_atomic(&entry.join(TAG_FILE), tag.as_bytes()).map_err(|e| {
            cache::operation_failed(format!(
                "Failed to write tag file in {}: {e}",
                entry.display()
            ))
        })?;

        write_atomic(&path, content.as_bytes()).map_err(|e| {
            cache::operation_failed(format!(
                "Failed to store bundle for tag '{tag}' at {}: {e}",
                path.display()
            ))
        })?;

        tracing::info!(tag, bundle = %bundle.name, path = %path.display(), "stored bundle in cache");
        Ok(path)
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        ensure_writable_dir(&self.root).map_err(|e| {
            cache::operation_failed(format!(
                "Cache directory {} is not usable: {e}",
                self.root.display()
            ))
        })?;
        Ok(self.root.clone())
    }
}
