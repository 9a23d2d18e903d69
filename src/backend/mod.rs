//! Invocation backends
//!
//! A backend performs one action of a bundle against an installation. The
//! orchestrator only sees the [`Backend`] trait; which implementation runs
//! is decided by the configured [`Driver`].
//!
//! Every call returns exactly once. There is no partial success: a backend
//! that could not finish an action reports an error.

pub mod debug;
pub mod docker;
mod error;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::bundle::{self, Bundle};
use crate::config::{Config, Driver};

pub use debug::DebugBackend;
pub use docker::DockerBackend;
pub use error::BackendError;

/// Shared flag a caller sets to abort an in-flight action
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a backend needs to run one action
///
/// Built per invocation by the orchestrator and never persisted; the claim
/// records the parameters and the credential names instead.
#[derive(Clone)]
pub struct ActionArguments {
    pub installation: String,
    pub action: String,
    pub bundle: Arc<Bundle>,
    pub bundle_reference: String,
    pub credentials: BTreeMap<String, String>,
    pub parameters: BTreeMap<String, serde_json::Value>,
    pub mixins: Vec<String>,
    pub insecure: bool,
    pub cancellation: CancellationToken,
    /// Longest the action may run before it is killed
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ActionArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionArguments")
            .field("installation", &self.installation)
            .field("action", &self.action)
            .field("bundle", &self.bundle.name)
            .field("bundle_reference", &self.bundle_reference)
            .field("credentials", &self.credentials.keys().collect::<Vec<_>>())
            .field("parameters", &self.parameters)
            .field("mixins", &self.mixins)
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Render a parameter value the way it is handed to an invocation image
pub fn parameter_value_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub trait Backend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Parse a bundle file, verified unless `insecure`
    fn load_bundle(&self, path: &Path, insecure: bool) -> crate::error::Result<Bundle> {
        bundle::load_bundle_file(path, insecure)
    }

    fn install(&self, args: &ActionArguments) -> Result<(), BackendError>;

    fn upgrade(&self, args: &ActionArguments) -> Result<(), BackendError>;

    /// Run a custom action declared by the bundle
    fn invoke(&self, action: &str, args: &ActionArguments) -> Result<(), BackendError>;

    fn uninstall(&self, args: &ActionArguments) -> Result<(), BackendError>;
}

/// Backend for the configured driver
pub fn backend_for(config: &Config) -> Box<dyn Backend> {
    match config.settings.driver {
        Driver::Docker => {
            let kubeconfig = config
                .settings
                .docker
                .mount_kubeconfig
                .then(|| config.kubeconfig.clone());
            Box::new(DockerBackend::new(&config.settings.docker, kubeconfig))
        }
        Driver::Debug => Box::new(DebugBackend::new()),
    }
}
