//! Error types and handling for Stevedore
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`bundle`]: Bundle loading and verification errors
//! - [`cache`]: Bundle cache errors
//! - [`claim`]: Claim store errors
//! - [`action`]: Action orchestration errors
//! - [`credentials`]: Credential set errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors

pub mod action;
pub mod bundle;
pub mod cache;
pub mod claim;
pub mod config;
pub mod credentials;
pub mod fs;


use miette::Diagnostic;
use thiserror::Error;

use crate::backend::BackendError;

/// Main error type for Stevedore operations
#[derive(Error, Diagnostic, Debug)]
pub enum StevedoreError {
    // Bundle errors
    #[error("Bundle file not found: {path}")]
    #[diagnostic(
        code(stevedore::bundle::not_found),
        help("Pass the bundle definition with --file, or run 'stevedore create' to start one")
    )]
    BundleFileNotFound { path: String },

    #[error("Failed to parse bundle file {path}: {reason}")]
    #[diagnostic(code(stevedore::bundle::parse_failed))]
    BundleParseFailed { path: String, reason: String },

    #[error("Bundle verification failed for {path}: {reason}")]
    #[diagnostic(
        code(stevedore::bundle::verification_failed),
        help("Pin every invocation image by contentDigest, or pass --insecure to skip verification")
    )]
    BundleVerificationFailed { path: String, reason: String },

    #[error("Tag '{tag}' is not in the bundle cache")]
    #[diagnostic(
        code(stevedore::bundle::tag_not_cached),
        help("Pass --file together with --tag to load the bundle and cache it under the tag")
    )]
    TagNotCached { tag: String },

    // Cache errors
    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(stevedore::cache::operation_failed))]
    CacheOperationFailed { message: String },

    // Claim errors
    #[error("Installation '{name}' not found")]
    #[diagnostic(
        code(stevedore::claim::not_found),
        help("Run 'stevedore list' to see known installations")
    )]
    ClaimNotFound { name: String },

    #[error("Claim for installation '{name}' is corrupt: {reason}")]
    #[diagnostic(
        code(stevedore::claim::corrupt),
        help("Inspect or restore the claim file from its history log")
    )]
    ClaimCorrupt { name: String, reason: String },

    #[error("Failed to read claim for installation '{name}': {reason}")]
    #[diagnostic(code(stevedore::claim::read_failed))]
    ClaimReadFailed { name: String, reason: String },

    #[error("Failed to write claim for installation '{name}': {reason}")]
    #[diagnostic(code(stevedore::claim::write_failed))]
    ClaimWriteFailed { name: String, reason: String },

    #[error("Invalid installation name: '{name}'")]
    #[diagnostic(
        code(stevedore::claim::invalid_name),
        help("Installation names may contain letters, digits, '.', '_' and '-', and may not start with '.'")
    )]
    InvalidInstallationName { name: String },

    // Action errors
    #[error("Cannot {action} '{installation}': {}", .violations.join("; "))]
    #[diagnostic(code(stevedore::action::validation_failed))]
    ValidationFailed {
        action: String,
        installation: String,
        violations: Vec<String>,
    },

    #[error("Cannot {action} '{installation}': installation does not exist")]
    #[diagnostic(
        code(stevedore::action::precondition_failed),
        help("Install the bundle first with 'stevedore install'")
    )]
    PreconditionFailed { action: String, installation: String },

    #[error("{action} of '{installation}' failed")]
    #[diagnostic(code(stevedore::action::failed))]
    ActionFailed {
        action: String,
        installation: String,
        #[source]
        source: BackendError,
    },

    #[error("{action} of '{installation}' {outcome}, but its claim could not be recorded")]
    #[diagnostic(
        code(stevedore::action::tracking_failed),
        help(
            "Installation tracking for '{installation}' may be stale; check it with 'stevedore show {installation}'"
        )
    )]
    TrackingFailed {
        action: String,
        installation: String,
        outcome: String,
        #[source]
        source: Box<StevedoreError>,
        action_error: Option<Box<StevedoreError>>,
    },

    #[error("Failed to build invocation image for bundle '{bundle}': {reason}")]
    #[diagnostic(code(stevedore::action::build_failed))]
    BuildFailed { bundle: String, reason: String },

    // Credential errors
    #[error("Credential set not found: {name}")]
    #[diagnostic(
        code(stevedore::credentials::not_found),
        help("Credential sets live in <home>/credentials/<name>.yaml, or pass a path to a file")
    )]
    CredentialSetNotFound { name: String },

    #[error("Failed to parse credential set {path}: {reason}")]
    #[diagnostic(code(stevedore::credentials::parse_failed))]
    CredentialSetParseFailed { path: String, reason: String },

    #[error("Failed to resolve credential '{credential}': {reason}")]
    #[diagnostic(code(stevedore::credentials::source_failed))]
    CredentialSourceFailed { credential: String, reason: String },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(stevedore::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(stevedore::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(stevedore::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(stevedore::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(stevedore::fs::io_error))]
    IoError { message: String },
}

impl StevedoreError {
    /// True for errors that mean an action ran (or may have run) but its claim is stale
    pub fn is_tracking_failure(&self) -> bool {
        matches!(self, StevedoreError::TrackingFailed { .. })
    }
}

impl From<std::io::Error> for StevedoreError {
    fn from(err: std::io::Error) -> Self {
        StevedoreError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for StevedoreError {
    fn from(err: serde_yaml::Error) -> Self {
        StevedoreError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StevedoreError {
    fn from(err: serde_json::Error) -> Self {
        StevedoreError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, StevedoreError>;
