//! High-level operations coordinating the cache, claim store and backend
//!
//! - [`action`]: install, upgrade, invoke and uninstall through one orchestrator

pub mod action;
