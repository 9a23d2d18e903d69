//! Reading bundle definitions from disk
//!
//! [`load_bundle_file`] is the verified entry point, used by the backends
//! and for cache hits. [`read_bundle_file`] only parses, for peeking at
//! bundle names and for building.

use std::fs;
use std::path::{Path, PathBuf};

use super::Bundle;
use crate::error::{Result, bundle};
use crate::hash;

/// Suffix of the optional sidecar file carrying the expected bundle digest
pub const DIGEST_SUFFIX: &str = ".digest";

/// Parse a bundle file without verification
pub fn read_bundle_file(path: &Path) -> Result<Bundle> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            bundle::file_not_found(path.display().to_string())
        } else {
            bundle::parse_failed(path.display().to_string(), e.to_string())
        }
    })?;

    let parsed: Bundle = serde_json::from_str(&content)
        .map_err(|e| bundle::parse_failed(path.display().to_string(), e.to_string()))?;

    if parsed.name.trim().is_empty() {
        return Err(bundle::parse_failed(
            path.display().to_string(),
            "bundle name is empty",
        ));
    }

    Ok(parsed)
}

/// Parse and, unless `insecure`, verify a bundle file
///
/// Verification requires every invocation image to be pinned by a
/// `contentDigest`, and the file to match its `<file>.digest` sidecar when
/// one is present.
pub fn load_bundle_file(path: &Path, insecure: bool) -> Result<Bundle> {
    let parsed = read_bundle_file(path)?;

    if insecure {
        tracing::warn!(
            bundle = %parsed.name,
            path = %path.display(),
            "loading bundle without verification (--insecure)"
        );
        return Ok(parsed);
    }

    verify(path, &parsed)?;
    tracing::debug!(bundle = %parsed.name, path = %path.display(), "bundle verified");
    Ok(parsed)
}

fn verify(path: &Path, parsed: &Bundle) -> Result<()> {
    let unpinned: Vec<&str> = parsed
        .invocation_images
        .iter()
        .filter(|image| image.content_digest.is_none())
        .map(|image| image.image.as_str())
        .collect();

    if !unpinned.is_empty() {
        return Err(bundle::verification_failed(
            path.display().to_string(),
            format!("invocation images not pinned by digest: {}", unpinned.join(", ")),
        ));
    }

    let sidecar = digest_path(path);
    if sidecar.is_file() {
        let expected = fs::read_to_string(&sidecar)
            .map_err(|e| bundle::verification_failed(sidecar.display().to_string(), e.to_string()))?;
        let actual = hash::hash_file(path)?;
        if !hash::verify_hash(&expected, &actual) {
            return Err(bundle::verification_failed(
                path.display().to_string(),
                format!("digest mismatch: expected {}, got {}", expected.trim(), actual),
            ));
        }
    }

    Ok(())
}

/// Path of the digest sidecar for a bundle file
pub fn digest_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(DIGEST_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StevedoreError;
    use tempfile::TempDir;

    const PINNED: &str = r#"{
        "name": "example",
        "version": "0.1.0",
        "invocationImages": [{ "image": "example/installer:0.1.0", "contentDigest": "sha256:abc" }]
    }"#;

    const UNPINNED: &str = r#"{
        "name": "example",
        "invocationImages": [{ "image": "example/installer:latest" }]
    }"#;

    fn write(temp: &TempDir, content: &str) -> PathBuf {
        let path = temp.path().join("bundle.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_pinned_bundle() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, PINNED);
        let bundle = load_bundle_file(&path, false).unwrap();
        assert_eq!(bundle.name, "example");
    }

    #[test]
    fn test_unpinned_bundle_requires_insecure() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, UNPINNED);

        let err = load_bundle_file(&path, false).unwrap_err();
        assert!(matches!(err, StevedoreError::BundleVerificationFailed { .. }));

        assert!(load_bundle_file(&path, true).is_ok());
    }

    #[test]
    fn test_digest_sidecar_mismatch() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, PINNED);
        std::fs::write(digest_path(&path), "blake3:0000").unwrap();

        let err = load_bundle_file(&path, false).unwrap_err();
        assert!(err.to_string().contains("verification failed"));
    }

    #[test]
    fn test_digest_sidecar_match() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, PINNED);
        std::fs::write(digest_path(&path), hash::hash_bytes(PINNED.as_bytes())).unwrap();

        assert!(load_bundle_file(&path, false).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = read_bundle_file(Path::new("/nonexistent/bundle.json")).unwrap_err();
        assert!(matches!(err, StevedoreError::BundleFileNotFound { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "{ not json");
        let err = read_bundle_file(&path).unwrap_err();
        assert!(matches!(err, StevedoreError::BundleParseFailed { .. }));
    }
}
