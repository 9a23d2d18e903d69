//! Configuration errors

use super::StevedoreError;

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> StevedoreError {
    StevedoreError::ConfigInvalid {
        message: message.into(),
    }
}
