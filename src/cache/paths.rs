//! Cache path utilities and constants
//!
//! ```text
//! <home>/cache/
//! └── <blake3(tag)>/
//!     ├── bundle.json    # the bundle definition, published by rename
//!     └── tag            # the original tag, for listing
//! ```

use std::path::{Path, PathBuf};

use crate::hash;

/// File holding the cached bundle definition inside an entry
pub const BUNDLE_FILE: &str = "bundle.json";

/// File recording the tag an entry was stored under
pub const TAG_FILE: &str = "tag";

/// Directory name of the entry for `tag`
///
/// Tags contain characters that are not path-safe (`/`, `:`, `@`), so the
/// key is the BLAKE3 hex digest of the tag.
pub fn tag_key(tag: &str) -> String {
    hash::key_for(tag)
}

/// Directory of the cache entry for `tag`
pub fn entry_dir(root: &Path, tag: &str) -> PathBuf {
    root.join(tag_key(tag))
}

/// Path of the bundle definition for `tag`
pub fn entry_bundle_path(root: &Path, tag: &str) -> PathBuf {
    entry_dir(root, tag).join(BUNDLE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_paths() {
        let root = Path::new("/home/me/.stevedore/cache");
        let path = entry_bundle_path(root, "registry.example.com/example:v1");
        assert!(path.starts_with(root));
        assert!(path.ends_with(BUNDLE_FILE));
        assert_eq!(
            path.parent().unwrap(),
            entry_dir(root, "registry.example.com/example:v1")
        );
    }

    #[test]
    fn test_distinct_tags_get_distinct_entries() {
        let root = Path::new("/cache");
        assert_ne!(entry_dir(root, "example:v1"), entry_dir(root, "example:v2"));
    }

    #[test]
    fn test_tag_key_is_path_safe() {
        let key = tag_key("ghcr.io/org/bundle@sha256:abc");
        assert!(!key.contains('/'));
        assert!(!key.contains(':'));
        assert!(!key.contains('@'));
    }
}
