//! Backend execution errors
//!
//! These are opaque to the orchestrator, which wraps them with the action
//! and installation they happened in.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("bundle '{bundle}' declares no docker invocation image")]
    NoInvocationImage { bundle: String },

    #[error("failed to start '{command}': {reason}")]
    SpawnFailed { command: String, reason: String },

    #[error("failed to wait for '{command}': {reason}")]
    WaitFailed { command: String, reason: String },

    #[error("invocation image exited with status {code}")]
    NonZeroExit { code: i32 },

    #[error("invocation image was terminated by a signal")]
    Terminated,

    #[error("action was cancelled")]
    Cancelled,

    #[error("action did not finish within {seconds}s")]
    DeadlineExceeded { seconds: u64 },

    #[error("failed to stage {what}: {reason}")]
    Staging { what: String, reason: String },
}
