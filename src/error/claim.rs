//! Claim store errors
//!
//! Missing, corrupt and unreadable claims are separate variants so callers
//! can tell "never installed" apart from "record damaged".

use super::StevedoreError;

pub fn not_found(name: impl Into<String>) -> StevedoreError {
    StevedoreError::ClaimNotFound { name: name.into() }
}

pub fn corrupt(name: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::ClaimCorrupt {
        name: name.into(),
        reason: reason.into(),
    }
}

pub fn read_failed(name: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::ClaimReadFailed {
        name: name.into(),
        reason: reason.into(),
    }
}

pub fn write_failed(name: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::ClaimWriteFailed {
        name: name.into(),
        reason: reason.into(),
    }
}

pub fn invalid_name(name: impl Into<String>) -> StevedoreError {
    StevedoreError::InvalidInstallationName { name: name.into() }
}
