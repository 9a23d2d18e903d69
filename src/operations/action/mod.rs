//! Bundle action operation
//!
//! Drives install, upgrade, invoke and uninstall against an installation:
//! resolve the bundle, bind arguments, run the backend, record the claim.

pub mod arguments;
pub mod orchestrator;
pub mod request;
pub mod resolution;

pub use orchestrator::ActionOrchestrator;
pub use request::{ActionKind, ActionRequest, BundleSource};
