//! Action orchestration errors

use super::StevedoreError;
use crate::backend::BackendError;

/// Creates a validation error listing every violation found
pub fn validation_failed(
    action: impl Into<String>,
    installation: impl Into<String>,
    violations: Vec<String>,
) -> StevedoreError {
    StevedoreError::ValidationFailed {
        action: action.into(),
        installation: installation.into(),
        violations,
    }
}

/// Creates a precondition failed error (action requires an existing claim)
pub fn precondition_failed(
    action: impl Into<String>,
    installation: impl Into<String>,
) -> StevedoreError {
    StevedoreError::PreconditionFailed {
        action: action.into(),
        installation: installation.into(),
    }
}

/// Wraps a backend error with the action and installation it happened in
pub fn action_failed(
    action: impl Into<String>,
    installation: impl Into<String>,
    source: BackendError,
) -> StevedoreError {
    StevedoreError::ActionFailed {
        action: action.into(),
        installation: installation.into(),
        source,
    }
}

/// Creates a compound error: the action finished (successfully or not) but
/// its claim could not be written.
pub fn tracking_failed(
    action: impl Into<String>,
    installation: impl Into<String>,
    persistence: StevedoreError,
    action_error: Option<StevedoreError>,
) -> StevedoreError {
    let outcome = if action_error.is_some() {
        "failed"
    } else {
        "succeeded"
    };
    StevedoreError::TrackingFailed {
        action: action.into(),
        installation: installation.into(),
        outcome: outcome.to_string(),
        source: Box::new(persistence),
        action_error: action_error.map(Box::new),
    }
}

/// Creates a build failed error
pub fn build_failed(bundle: impl Into<String>, reason: impl Into<String>) -> StevedoreError {
    StevedoreError::BuildFailed {
        bundle: bundle.into(),
        reason: reason.into(),
    }
}
