//! What the caller asks the orchestrator to do

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::backend::CancellationToken;
use crate::bundle::{ACTION_INSTALL, ACTION_UNINSTALL, ACTION_UPGRADE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Install,
    Upgrade,
    /// A custom action the bundle declares
    Invoke(String),
    Uninstall,
}

impl ActionKind {
    pub fn name(&self) -> &str {
        match self {
            ActionKind::Install => ACTION_INSTALL,
            ActionKind::Upgrade => ACTION_UPGRADE,
            ActionKind::Invoke(action) => action,
            ActionKind::Uninstall => ACTION_UNINSTALL,
        }
    }

    /// Everything except install operates on an existing installation
    pub fn requires_claim(&self) -> bool {
        !matches!(self, ActionKind::Install)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the bundle for an action comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleSource {
    /// Resolve through the bundle cache; on a miss load `file` and cache it
    Tag { tag: String, file: Option<PathBuf> },
    /// Load a bundle file directly, bypassing the cache
    File(PathBuf),
    /// Reuse the bundle recorded in the installation's claim
    Claim,
}

#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub installation: String,
    pub action: ActionKind,
    pub source: BundleSource,
    /// Skip bundle verification
    pub insecure: bool,
    /// Raw `name=value` parameter values, typed against the bundle later
    pub parameters: BTreeMap<String, String>,
    /// Credential set names or paths, resolved in order
    pub credential_sets: Vec<String>,
    /// Build the invocation image first when it is missing (install only)
    pub build: bool,
    pub cancellation: CancellationToken,
    pub timeout: Option<Duration>,
}

impl ActionRequest {
    pub fn new(installation: impl Into<String>, action: ActionKind, source: BundleSource) -> Self {
        Self {
            installation: installation.into(),
            action,
            source,
            insecure: false,
            parameters: BTreeMap::new(),
            credential_sets: Vec::new(),
            build: false,
            cancellation: CancellationToken::new(),
            timeout: None,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_credential_set(mut self, set: impl Into<String>) -> Self {
        self.credential_sets.push(set.into());
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }
}
