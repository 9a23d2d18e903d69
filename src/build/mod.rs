//! Invocation image building
//!
//! Building is a precondition of installing a bundle from source: the
//! orchestrator asks the provider whether the image exists and only builds
//! when it does not.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::bundle::Bundle;
use crate::config::{Config, Driver};
use crate::error::{Result, action};

/// File the build context must contain
pub const DOCKERFILE: &str = "Dockerfile";

pub trait BuildProvider: Send + Sync {
    /// True when the bundle's invocation image is already available
    fn is_built(&self, bundle: &Bundle) -> Result<bool>;

    /// Build the bundle's invocation image from the context in `dir`
    fn build_invocation_image(&self, bundle: &Bundle, dir: &Path) -> Result<()>;
}

/// Builds invocation images with `docker build`
#[derive(Debug, Clone)]
pub struct DockerBuilder {
    command: String,
}

impl DockerBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn image_tag(bundle: &Bundle) -> Result<&str> {
        bundle
            .docker_image()
            .map(|i| i.image.as_str())
            .ok_or_else(|| action::build_failed(&bundle.name, "no docker invocation image declared"))
    }
}

impl BuildProvider for DockerBuilder {
    fn is_built(&self, bundle: &Bundle) -> Result<bool> {
        let tag = Self::image_tag(bundle)?;
        let status = Command::new(&self.command)
            .args(["image", "inspect", tag])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| action::build_failed(&bundle.name, format!("{}: {e}", self.command)))?;
        Ok(status.success())
    }

    fn build_invocation_image(&self, bundle: &Bundle, dir: &Path) -> Result<()> {
        let tag = Self::image_tag(bundle)?;
        if !dir.join(DOCKERFILE).is_file() {
            return Err(action::build_failed(
                &bundle.name,
                format!("no {DOCKERFILE} in {}", dir.display()),
            ));
        }

        tracing::info!(bundle = %bundle.name, image = tag, dir = %dir.display(), "building invocation image");
        let status = Command::new(&self.command)
            .args(["build", "--tag", tag])
            .arg(dir)
            .status()
            .map_err(|e| action::build_failed(&bundle.name, format!("{}: {e}", self.command)))?;

        if status.success() {
            Ok(())
        } else {
            Err(action::build_failed(
                &bundle.name,
                format!("{} build exited with {status}", self.command),
            ))
        }
    }
}

/// Build provider that never builds anything
#[derive(Debug, Clone, Default)]
pub struct NoopBuilder;

impl BuildProvider for NoopBuilder {
    fn is_built(&self, _bundle: &Bundle) -> Result<bool> {
        Ok(true)
    }

    fn build_invocation_image(&self, bundle: &Bundle, _dir: &Path) -> Result<()> {
        tracing::info!(bundle = %bundle.name, "debug driver: skipping image build");
        Ok(())
    }
}

/// Build provider matching the configured driver
pub fn builder_for(config: &Config) -> Box<dyn BuildProvider> {
    match config.settings.driver {
        Driver::Docker => Box::new(DockerBuilder::new(&config.settings.docker.command)),
        Driver::Debug => Box::new(NoopBuilder),
    }
}
