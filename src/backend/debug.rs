//! No-op backend
//!
//! Prints the action it would perform and succeeds. Used with
//! `--driver debug` to check bundle resolution, credential binding and
//! claim tracking without a container runtime.

use console::Style;

use super::{ActionArguments, Backend, BackendError, parameter_value_string};
use crate::bundle::{ACTION_INSTALL, ACTION_UNINSTALL, ACTION_UPGRADE};

#[derive(Debug, Clone, Default)]
pub struct DebugBackend;

impl DebugBackend {
    pub fn new() -> Self {
        Self
    }

    /// Text printed for one action
    pub fn describe(action: &str, args: &ActionArguments) -> String {
        let image = args
            .bundle
            .docker_image()
            .map_or_else(|| "<no invocation image>".to_string(), |i| i.reference());

        let mut lines = vec![format!(
            "would {action} '{}' using bundle {} {} ({image})",
            args.installation, args.bundle.name, args.bundle.version
        )];
        for (name, value) in &args.parameters {
            lines.push(format!("  parameter {name} = {}", parameter_value_string(value)));
        }
        for name in args.credentials.keys() {
            lines.push(format!("  credential {name} = ******"));
        }
        if !args.mixins.is_empty() {
            lines.push(format!("  mixins: {}", args.mixins.join(", ")));
        }
        lines.join("\n")
    }

    fn run(action: &str, args: &ActionArguments) -> Result<(), BackendError> {
        if args.cancellation.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        tracing::info!(installation = %args.installation, action, "debug backend: not running anything");
        println!(
            "{} {}",
            Style::new().cyan().apply_to("[debug]"),
            Self::describe(action, args)
        );
        Ok(())
    }
}

impl Backend for DebugBackend {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn install(&self, args: &ActionArguments) -> Result<(), BackendError> {
        Self::run(ACTION_INSTALL, args)
    }

    fn upgrade(&self, args: &ActionArguments) -> Result<(), BackendError> {
        Self::run(ACTION_UPGRADE, args)
    }

    fn invoke(&self, action: &str, args: &ActionArguments) -> Result<(), BackendError> {
        Self::run(action, args)
    }

    fn uninstall(&self, args: &ActionArguments) -> Result<(), BackendError> {
        Self::run(ACTION_UNINSTALL, args)
    }
}
