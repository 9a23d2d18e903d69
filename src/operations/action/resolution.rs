//! Bundle resolution for an action
//!
//! A tag goes through the cache. A plain file is loaded directly and never
//! touches the cache. Without either, the bundle snapshot in the
//! installation's claim is reused.
//!
//! Only verified bundles are stored in the cache, and a cache hit is checked
//! again unless the request is `insecure`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::request::BundleSource;
use crate::backend::Backend;
use crate::bundle::{Bundle, load_bundle_file};
use crate::cache::BundleCache;
use crate::claim::Claim;
use crate::config::Config;
use crate::error::{Result, bundle};

/// A bundle ready to act on
#[derive(Debug, Clone)]
pub struct ResolvedBundle {
    pub bundle: Arc<Bundle>,
    /// Tag or absolute file path, recorded in the claim
    pub reference: String,
    /// Directory holding the bundle file, used as the build context
    pub dir: Option<PathBuf>,
}

pub fn resolve_bundle(
    source: &BundleSource,
    insecure: bool,
    backend: &dyn Backend,
    cache: &dyn BundleCache,
    previous: Option<&Claim>,
) -> Result<ResolvedBundle> {
    match source {
        BundleSource::Tag { tag, file } => {
            if let Some(path) = cache.find_bundle(tag)? {
                return Ok(ResolvedBundle {
                    bundle: Arc::new(load_bundle_file(&path, insecure)?),
                    reference: tag.clone(),
                    dir: file.as_deref().and_then(parent_dir),
                });
            }

            let Some(file) = file else {
                return Err(bundle::tag_not_cached(tag));
            };
            let loaded = backend.load_bundle(file, insecure)?;
            if insecure {
                tracing::warn!(tag = tag.as_str(), "not caching bundle loaded without verification");
            } else {
                cache.store_bundle(tag, &loaded)?;
            }
            Ok(ResolvedBundle {
                bundle: Arc::new(loaded),
                reference: tag.clone(),
                dir: parent_dir(file),
            })
        }
        BundleSource::File(file) => {
            let loaded = backend.load_bundle(file, insecure)?;
            Ok(ResolvedBundle {
                bundle: Arc::new(loaded),
                reference: Config::absolute(file).display().to_string(),
                dir: parent_dir(file),
            })
        }
        BundleSource::Claim => {
            let claim = previous.ok_or_else(|| bundle::file_not_found("(no --file or --tag given)"))?;
            Ok(ResolvedBundle {
                bundle: Arc::new(claim.bundle.clone()),
                reference: claim.bundle_reference.clone(),
                dir: None,
            })
        }
    }
}

fn parent_dir(file: &Path) -> Option<PathBuf> {
    let absolute = Config::absolute(file);
    absolute.parent().map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FsBundleCache;
    use crate::error::StevedoreError;
    use crate::test_fixtures::{RecordingBackend, RecordingCache, example_bundle, write_bundle};
    use tempfile::TempDir;

    #[test]
    fn test_tag_miss_loads_and_stores() {
        let temp = TempDir::new().unwrap();
        let file = write_bundle(temp.path(), &example_bundle());
        let cache = FsBundleCache::new(temp.path().join("cache"));
        let backend = RecordingBackend::new();

        let source = BundleSource::Tag {
            tag: "example:v1".to_string(),
            file: Some(file),
        };
        let resolved = resolve_bundle(&source, false, &backend, &cache, None).unwrap();
        assert_eq!(resolved.reference, "example:v1");
        assert_eq!(backend.load_count(), 1);
        assert!(cache.find_bundle("example:v1").unwrap().is_some());

        // Second resolution is a cache hit and does not load again
        resolve_bundle(&source, false, &backend, &cache, None).unwrap();
        assert_eq!(backend.load_count(), 1);
    }

    #[test]
    fn test_tag_miss_without_file() {
        let temp = TempDir::new().unwrap();
        let cache = FsBundleCache::new(temp.path());
        let source = BundleSource::Tag {
            tag: "example:v1".to_string(),
            file: None,
        };
        let err =
            resolve_bundle(&source, false, &RecordingBackend::new(), &cache, None).unwrap_err();
        assert!(matches!(err, StevedoreError::TagNotCached { .. }));
    }

    #[test]
    fn test_file_bypasses_cache() {
        let temp = TempDir::new().unwrap();
        let file = write_bundle(temp.path(), &Bundle::template("example"));
        let cache = RecordingCache::new(temp.path().join("cache"));

        let resolved = resolve_bundle(
            &BundleSource::File(file),
            true,
            &RecordingBackend::new(),
            &cache,
            None,
        )
        .unwrap();
        assert_eq!(resolved.bundle.name, "example");
        assert!(resolved.reference.ends_with("bundle.json"));
        assert_eq!(cache.find_count(), 0);
        assert_eq!(cache.store_count(), 0);
        assert!(!temp.path().join("cache").exists());
    }

    #[test]
    fn test_cache_hit_skips_loading() {
        let temp = TempDir::new().unwrap();
        let cache = RecordingCache::new(temp.path().join("cache"));
        let mut cached = example_bundle();
        cached.name = "cached".to_string();
        cache.store_bundle("example:v1", &cached).unwrap();
        let backend = RecordingBackend::new();

        let source = BundleSource::Tag {
            tag: "example:v1".to_string(),
            file: Some(temp.path().join("missing.json")),
        };
        let resolved = resolve_bundle(&source, false, &backend, &cache, None).unwrap();
        assert_eq!(resolved.bundle.name, "cached");
        assert_eq!(backend.load_count(), 0);
        assert_eq!(cache.find_count(), 1);
        assert_eq!(cache.store_count(), 1);
        assert_eq!(cache.cache_dir().unwrap(), temp.path().join("cache"));
    }

    #[test]
    fn test_insecure_load_is_not_cached() {
        let temp = TempDir::new().unwrap();
        let file = write_bundle(temp.path(), &Bundle::template("loose"));
        let cache = RecordingCache::new(temp.path().join("cache"));
        let backend = RecordingBackend::new();
        let source = BundleSource::Tag {
            tag: "loose:v1".to_string(),
            file: Some(file),
        };

        let resolved = resolve_bundle(&source, true, &backend, &cache, None).unwrap();
        assert_eq!(resolved.bundle.name, "loose");
        assert_eq!(cache.store_count(), 0);
        assert!(cache.find_bundle("loose:v1").unwrap().is_none());

        // A verified request for the same tag loads the file again and refuses it
        let err = resolve_bundle(&source, false, &backend, &cache, None).unwrap_err();
        assert!(matches!(err, StevedoreError::BundleVerificationFailed { .. }));
        assert_eq!(backend.load_count(), 2);
    }

    #[test]
    fn test_unpinned_cache_entry_fails_verified_resolve() {
        let temp = TempDir::new().unwrap();
        let cache = FsBundleCache::new(temp.path().join("cache"));
        cache
            .store_bundle("loose:v1", &Bundle::template("loose"))
            .unwrap();
        let backend = RecordingBackend::new();
        let source = BundleSource::Tag {
            tag: "loose:v1".to_string(),
            file: None,
        };

        let err = resolve_bundle(&source, false, &backend, &cache, None).unwrap_err();
        assert!(matches!(err, StevedoreError::BundleVerificationFailed { .. }));

        let resolved = resolve_bundle(&source, true, &backend, &cache, None).unwrap();
        assert_eq!(resolved.bundle.name, "loose");
        assert_eq!(backend.load_count(), 0);
    }

    #[test]
    fn test_claim_source_without_claim() {
        let temp = TempDir::new().unwrap();
        let err = resolve_bundle(
            &BundleSource::Claim,
            false,
            &RecordingBackend::new(),
            &FsBundleCache::new(temp.path()),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, StevedoreError::BundleFileNotFound { .. }));
    }
}
