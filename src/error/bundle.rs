//! Bundle loading and verification errors

use super::StevedoreError;

/// Creates a bundle file not found error
pub fn file_not_found(path: impl Into<String>) -> StevedoreError {
    StevedoreError::BundleFileNotFound { path: path.into() }
}

/// Creates a bundle parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::BundleParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a bundle verification failed error
pub fn verification_failed(path: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::BundleVerificationFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a tag not cached error
pub fn tag_not_cached(tag: impl Into<String>) -> StevedoreError {
    StevedoreError::TagNotCached { tag: tag.into() }
}
