//! Cache listing and statistics

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, cache};

use super::{BUNDLE_FILE, TAG_FILE};

/// One cached bundle, as shown by `stevedore cache list`
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Tag the bundle was stored under
    pub tag: String,
    /// Path of the cached bundle definition
    pub path: PathBuf,
    /// Size of the entry in bytes
    pub size: u64,
}

impl CacheEntry {
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of cached tags
    pub entries: usize,
    /// Total size in bytes
    pub total_size: u64,
}

impl CacheStats {
    pub fn from_entries(entries: &[CacheEntry]) -> Self {
        Self {
            entries: entries.len(),
            total_size: entries.iter().map(|e| e.size).sum(),
        }
    }

    pub fn formatted_size(&self) -> String {
        format_size(self.total_size)
    }
}

/// List every complete entry under `root`, sorted by tag
///
/// Directories without a published `bundle.json` are skipped: they belong to
/// a store that is still in progress.
pub fn list_entries(root: &Path) -> Result<Vec<CacheEntry>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(root)
        .map_err(|e| cache::operation_failed(format!("Failed to read cache directory: {e}")))?
    {
        let entry =
            entry.map_err(|e| cache::operation_failed(format!("Failed to read entry: {e}")))?;
        let dir = entry.path();
        let bundle_path = dir.join(BUNDLE_FILE);
        if !dir.is_dir() || !bundle_path.is_file() {
            continue;
        }

        let tag = fs::read_to_string(dir.join(TAG_FILE))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| entry.file_name().to_string_lossy().to_string());

        entries.push(CacheEntry {
            tag,
            path: bundle_path,
            size: dir_size(&dir)?,
        });
    }

    entries.sort_by(|a, b| a.tag.cmp(&b.tag));
    Ok(entries)
}

fn dir_size(path: &Path) -> Result<u64> {
    let mut size = 0u64;
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            size += entry
                .metadata()
                .map_err(|e| cache::operation_failed(format!("Failed to get metadata: {e}")))?
                .len();
        }
    }
    Ok(size)
}

fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < 1024.0 {
        format!("{bytes} B")
    } else if size < 1024.0 * 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else if size < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", size / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
    }
}
