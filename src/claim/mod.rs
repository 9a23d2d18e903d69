//! Claims: the durable record of one named installation
//!
//! Every action writes two revisions of the claim: an `underway` revision
//! before the backend is called and a final `success`/`failure` revision
//! afterwards. An interrupted action therefore stays visible as underway
//! instead of disappearing from tracking.
//!
//! The lifecycle state of an installation is derived from the latest
//! revision (see [`Claim::state`]); only the last rest state reached by a
//! successful action is persisted.

mod store;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bundle::{ACTION_INSTALL, ACTION_UNINSTALL, ACTION_UPGRADE, Bundle};

pub use store::{ClaimStore, FileClaimStore, validate_name};

/// Outcome of the action a claim revision records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Underway,
    Success,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Underway => write!(f, "underway"),
            Status::Success => write!(f, "success"),
            Status::Failure => write!(f, "failure"),
        }
    }
}

/// States an installation rests in between actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestState {
    #[default]
    Unknown,
    Installed,
    Upgraded,
    Uninstalled,
}

impl RestState {
    /// Rest state reached when `action` succeeds from `self`
    fn after(self, action: &str) -> RestState {
        match action {
            ACTION_INSTALL => RestState::Installed,
            ACTION_UPGRADE => RestState::Upgraded,
            ACTION_UNINSTALL => RestState::Uninstalled,
            _ => self,
        }
    }
}

impl fmt::Display for RestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestState::Unknown => write!(f, "unknown"),
            RestState::Installed => write!(f, "installed"),
            RestState::Upgraded => write!(f, "upgraded"),
            RestState::Uninstalled => write!(f, "uninstalled"),
        }
    }
}

/// Lifecycle state of an installation, derived from its claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationState {
    Unknown,
    Installing,
    Installed,
    Upgrading,
    Upgraded,
    Invoking,
    Uninstalling,
    Uninstalled,
    /// The last action failed; carries the last state a successful action reached
    Failed(RestState),
}

impl From<RestState> for InstallationState {
    fn from(state: RestState) -> Self {
        match state {
            RestState::Unknown => InstallationState::Unknown,
            RestState::Installed => InstallationState::Installed,
            RestState::Upgraded => InstallationState::Upgraded,
            RestState::Uninstalled => InstallationState::Uninstalled,
        }
    }
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallationState::Unknown => write!(f, "unknown"),
            InstallationState::Installing => write!(f, "installing"),
            InstallationState::Installed => write!(f, "installed"),
            InstallationState::Upgrading => write!(f, "upgrading"),
            InstallationState::Upgraded => write!(f, "upgraded"),
            InstallationState::Invoking => write!(f, "invoking"),
            InstallationState::Uninstalling => write!(f, "uninstalling"),
            InstallationState::Uninstalled => write!(f, "uninstalled"),
            InstallationState::Failed(last) => write!(f, "failed (last good: {last})"),
        }
    }
}

/// What the latest revision attempted and how it went
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResult {
    pub action: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub name: String,

    /// Incremented on every write for this name
    pub revision: u64,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,

    /// Snapshot of the bundle definition the action ran against
    pub bundle: Bundle,

    /// Tag or file path the bundle was resolved from
    pub bundle_reference: String,

    pub result: ClaimResult,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_successful_action: Option<String>,

    #[serde(default)]
    pub last_good_state: RestState,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, serde_json::Value>,

    /// Names of the credentials bound; values are never recorded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<String>,
}

impl Claim {
    /// Start a new action on an installation, producing the `underway` revision
    ///
    /// `previous` is the installation's current claim, if any. Its creation
    /// time and last good state carry over.
    pub fn begin(
        previous: Option<&Claim>,
        name: &str,
        action: &str,
        bundle: &Bundle,
        bundle_reference: &str,
        parameters: BTreeMap<String, serde_json::Value>,
        credentials: Vec<String>,
    ) -> Claim {
        let now = Utc::now();
        Claim {
            name: name.to_string(),
            revision: previous.map_or(1, |p| p.revision + 1),
            created: previous.map_or(now, |p| p.created),
            modified: now,
            bundle: bundle.clone(),
            bundle_reference: bundle_reference.to_string(),
            result: ClaimResult {
                action: action.to_string(),
                status: Status::Underway,
                message: None,
            },
            last_successful_action: previous.and_then(|p| p.last_successful_action.clone()),
            last_good_state: previous.map(|p| p.last_good_state).unwrap_or_default(),
            parameters,
            credentials,
        }
    }

    /// Record the outcome of the action this claim is underway for
    pub fn finish(&self, outcome: std::result::Result<(), String>) -> Claim {
        let mut next = self.clone();
        next.revision = self.revision + 1;
        next.modified = Utc::now();
        match outcome {
            Ok(()) => {
                next.result.status = Status::Success;
                next.result.message = None;
                next.last_good_state = self.last_good_state.after(&self.result.action);
                next.last_successful_action = Some(self.result.action.clone());
            }
            Err(message) => {
                next.result.status = Status::Failure;
                next.result.message = Some(message);
            }
        }
        next
    }

    /// Lifecycle state derived from the latest revision
    pub fn state(&self) -> InstallationState {
        match self.result.status {
            Status::Success => self.last_good_state.into(),
            Status::Failure => InstallationState::Failed(self.last_good_state),
            Status::Underway => match self.result.action.as_str() {
                ACTION_INSTALL => InstallationState::Installing,
                ACTION_UPGRADE => InstallationState::Upgrading,
                ACTION_UNINSTALL => InstallationState::Uninstalling,
                _ => InstallationState::Invoking,
            },
        }
    }
}
