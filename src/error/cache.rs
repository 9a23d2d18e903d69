//! Cache errors

use super::StevedoreError;

/// Creates a cache operation failed error
pub fn operation_failed(message: impl Into<String>) -> StevedoreError {
    StevedoreError::CacheOperationFailed {
        message: message.into(),
    }
}
