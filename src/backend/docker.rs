//! Containerized backend
//!
//! Runs the bundle's docker invocation image once per action:
//!
//! ```text
//! docker run --rm --name stevedore-<installation>-<pid>-<micros> \
//!   --env CNAB_ACTION --env CNAB_INSTALLATION_NAME \
//!   --env CNAB_BUNDLE_NAME --env CNAB_BUNDLE_VERSION \
//!   --env <credential/parameter env vars...> \
//!   --volume <staged file>:<declared path>:ro ... \
//!   <image>@<digest> /cnab/app/run
//! ```
//!
//! Values are passed through the child's environment (`--env NAME` without
//! a value), so secrets never appear on the command line. File-bound values
//! are staged in a temporary directory that lives as long as the container.
//!
//! The container is named so that a cancelled or timed out action can stop
//! it with `docker kill`. Killing only the local client would leave the
//! container running.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tempfile::TempDir;

use super::{ActionArguments, Backend, BackendError, parameter_value_string};
use crate::bundle::{ACTION_INSTALL, ACTION_UNINSTALL, ACTION_UPGRADE, Location};
use crate::config::DockerSettings;

/// Entrypoint every invocation image provides
pub const RUN_PATH: &str = "/cnab/app/run";

/// Where the kubeconfig is mounted when enabled
pub const KUBECONFIG_MOUNT: &str = "/root/.kube/config";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct DockerBackend {
    command: String,
    kubeconfig: Option<PathBuf>,
    poll_interval: Duration,
}

impl DockerBackend {
    pub fn new(settings: &DockerSettings, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            command: settings.command.clone(),
            kubeconfig,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Assemble the command running `action` in a container named `container`
    ///
    /// Files the container needs are written into `staging`.
    pub fn command_for(
        &self,
        action: &str,
        args: &ActionArguments,
        staging: &Path,
        container: &str,
    ) -> Result<Command, BackendError> {
        let bundle = &args.bundle;
        let image = bundle
            .docker_image()
            .ok_or_else(|| BackendError::NoInvocationImage {
                bundle: bundle.name.clone(),
            })?;

        let mut cmd = Command::new(&self.command);
        cmd.args(["run", "--rm", "--name", container]);

        set_env(&mut cmd, "CNAB_ACTION", action);
        set_env(&mut cmd, "CNAB_INSTALLATION_NAME", &args.installation);
        set_env(&mut cmd, "CNAB_BUNDLE_NAME", &bundle.name);
        set_env(&mut cmd, "CNAB_BUNDLE_VERSION", &bundle.version);

        let mut staged = 0usize;
        let mut stage_file = |cmd: &mut Command, target: &Path, value: &str| {
            staged += 1;
            let host = staging.join(format!("value-{staged}"));
            std::fs::write(&host, value).map_err(|e| BackendError::Staging {
                what: target.display().to_string(),
                reason: e.to_string(),
            })?;
            cmd.arg("--volume")
                .arg(format!("{}:{}:ro", host.display(), target.display()));
            Ok::<(), BackendError>(())
        };

        for (name, credential) in &bundle.credentials {
            let Some(value) = args.credentials.get(name) else {
                continue;
            };
            match &credential.location {
                Location {
                    path: Some(path), ..
                } => {
                    stage_file(&mut cmd, path, value)?;
                    if let Some(env) = &credential.location.env {
                        set_env(&mut cmd, env, value);
                    }
                }
                Location { env: Some(env), .. } => set_env(&mut cmd, env, value),
                Location { .. } => set_env(&mut cmd, &default_env_name(name), value),
            }
        }

        for (name, value) in &args.parameters {
            let value = parameter_value_string(value);
            let destination = bundle
                .parameters
                .get(name)
                .and_then(|p| p.destination.clone())
                .unwrap_or_default();
            if let Some(path) = &destination.path {
                stage_file(&mut cmd, path, &value)?;
            }
            match (&destination.env, &destination.path) {
                (Some(env), _) => set_env(&mut cmd, env, &value),
                (None, None) => {
                    set_env(&mut cmd, &format!("CNAB_P_{}", default_env_name(name)), &value);
                }
                (None, Some(_)) => {}
            }
        }

        if let Some(kubeconfig) = &self.kubeconfig {
            cmd.arg("--volume")
                .arg(format!("{}:{KUBECONFIG_MOUNT}:ro", kubeconfig.display()));
        }

        cmd.arg(image.reference()).arg(RUN_PATH);
        Ok(cmd)
    }

    fn run(&self, action: &str, args: &ActionArguments) -> Result<(), BackendError> {
        if args.cancellation.is_cancelled() {
            return Err(BackendError::Cancelled);
        }

        let staging = TempDir::new().map_err(|e| BackendError::Staging {
            what: "staging directory".to_string(),
            reason: e.to_string(),
        })?;
        let container = container_name(&args.installation);
        let mut cmd = self.command_for(action, args, staging.path(), &container)?;

        tracing::info!(
            installation = %args.installation,
            action,
            bundle = %args.bundle.name,
            container = %container,
            "starting invocation image"
        );
        let child = cmd.spawn().map_err(|e| BackendError::SpawnFailed {
            command: self.command.clone(),
            reason: e.to_string(),
        })?;

        let status = self.wait(child, args, &container)?;
        tracing::info!(installation = %args.installation, action, %status, "invocation image finished");
        exit_result(status)
    }

    /// Poll `child` until it exits, stopping the container on cancellation
    /// or timeout
    fn wait(
        &self,
        mut child: Child,
        args: &ActionArguments,
        container: &str,
    ) -> Result<ExitStatus, BackendError> {
        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(e) => {
                    self.stop(&mut child, container);
                    return Err(BackendError::WaitFailed {
                        command: self.command.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            if args.cancellation.is_cancelled() {
                tracing::warn!(installation = %args.installation, "cancelling invocation image");
                self.stop(&mut child, container);
                return Err(BackendError::Cancelled);
            }

            if let Some(timeout) = args.timeout {
                if started.elapsed() >= timeout {
                    tracing::warn!(installation = %args.installation, ?timeout, "invocation image timed out");
                    self.stop(&mut child, container);
                    return Err(BackendError::DeadlineExceeded {
                        seconds: timeout.as_secs(),
                    });
                }
            }

            thread::sleep(self.poll_interval);
        }
    }

    /// Kill the container, then the client attached to it
    fn stop(&self, child: &mut Child, container: &str) {
        let killed = Command::new(&self.command)
            .args(["kill", container])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match killed {
            Ok(status) if status.success() => {
                tracing::debug!(container, "container killed");
            }
            Ok(status) => tracing::warn!(container, %status, "failed to kill container"),
            Err(e) => tracing::warn!(container, error = %e, "failed to kill container"),
        }

        if let Err(e) = child.kill() {
            tracing::debug!(error = %e, "client already exited");
        }
        let _ = child.wait();
    }
}

/// Unique container name for one action on `installation`
fn container_name(installation: &str) -> String {
    format!(
        "stevedore-{installation}-{}-{}",
        std::process::id(),
        Utc::now().timestamp_micros()
    )
}

fn set_env(cmd: &mut Command, name: &str, value: &str) {
    cmd.arg("--env").arg(name);
    cmd.env(name, value);
}

fn exit_result(status: ExitStatus) -> Result<(), BackendError> {
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(BackendError::NonZeroExit { code }),
        None => Err(BackendError::Terminated),
    }
}

/// `my-token` -> `MY_TOKEN`
fn default_env_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

impl Backend for DockerBackend {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn install(&self, args: &ActionArguments) -> Result<(), BackendError> {
        self.run(ACTION_INSTALL, args)
    }

    fn upgrade(&self, args: &ActionArguments) -> Result<(), BackendError> {
        self.run(ACTION_UPGRADE, args)
    }

    fn invoke(&self, action: &str, args: &ActionArguments) -> Result<(), BackendError> {
        self.run(action, args)
    }

    fn uninstall(&self, args: &ActionArguments) -> Result<(), BackendError> {
        self.run(ACTION_UNINSTALL, args)
    }
}
