//! Credential set errors

use super::StevedoreError;

/// Creates a credential set not found error
pub fn not_found(name: impl Into<String>) -> StevedoreError {
    StevedoreError::CredentialSetNotFound { name: name.into() }
}

/// Creates a credential set parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::CredentialSetParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a credential source failed error
pub fn source_failed(credential: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::CredentialSourceFailed {
        credential: credential.into(),
        reason: reason.into(),
    }
}
