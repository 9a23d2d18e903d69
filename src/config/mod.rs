//! Configuration for Stevedore
//!
//! Process-wide inputs (home directory, environment, kubeconfig location)
//! are captured once into a [`Config`] and passed by reference from there
//! on. Nothing reads or mutates the live process environment after
//! [`Config::from_env`].
//!
//! ```text
//! <home>/                      # $STEVEDORE_HOME or ~/.stevedore
//! ├── config.yaml              # optional settings
//! ├── cache/                   # bundle cache, see crate::cache
//! ├── claims/                  # claim store, see crate::claim
//! └── credentials/<set>.yaml   # credential sets
//! ```

pub mod credentials;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, config};

/// Environment variable overriding the home directory
pub const HOME_ENV: &str = "STEVEDORE_HOME";

/// Environment variable naming the kubeconfig used by the docker backend
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

pub const CONFIG_FILE: &str = "config.yaml";
pub const CACHE_DIR: &str = "cache";
pub const CLAIMS_DIR: &str = "claims";
pub const CREDENTIALS_DIR: &str = "credentials";

/// Execution backend selected for actions
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// Run the bundle's invocation image with the docker CLI
    #[default]
    Docker,
    /// Print what would run without running anything
    Debug,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Docker => write!(f, "docker"),
            Driver::Debug => write!(f, "debug"),
        }
    }
}

fn default_docker_command() -> String {
    "docker".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DockerSettings {
    /// Container CLI to run (`docker`, `podman`, ...)
    #[serde(default = "default_docker_command")]
    pub command: String,

    /// Mount the kubeconfig into the invocation image
    #[serde(default)]
    pub mount_kubeconfig: bool,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            command: default_docker_command(),
            mount_kubeconfig: false,
        }
    }
}

/// Contents of `<home>/config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub driver: Driver,

    #[serde(default)]
    pub docker: DockerSettings,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty file is a valid, default configuration
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub home: PathBuf,

    /// Snapshot of the environment credential sources resolve against
    pub env: BTreeMap<String, String>,

    pub kubeconfig: PathBuf,

    pub settings: Settings,
}

impl Config {
    /// Configuration with default settings, for an explicit home and environment
    pub fn new(home: impl Into<PathBuf>, env: BTreeMap<String, String>) -> Self {
        let home = home.into();
        let kubeconfig = env
            .get(KUBECONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".kube").join("config")))
            .unwrap_or_else(|| home.join(".kube").join("config"));

        Self {
            home,
            env,
            kubeconfig,
            settings: Settings::default(),
        }
    }

    /// Like [`Config::new`], then read `<home>/config.yaml` when present
    pub fn load(home: impl Into<PathBuf>, env: BTreeMap<String, String>) -> Result<Self> {
        let mut cfg = Self::new(home, env);
        let path = cfg.config_path();
        if path.is_file() {
            let content = fs::read_to_string(&path)
                .map_err(|e| config::parse_failed(path.display().to_string(), e.to_string()))?;
            cfg.settings = Settings::from_yaml(&content)
                .map_err(|e| config::parse_failed(path.display().to_string(), e.to_string()))?;
            tracing::debug!(path = %path.display(), driver = %cfg.settings.driver, "loaded settings");
        }
        Ok(cfg)
    }

    /// Capture the process environment and load configuration from it
    pub fn from_env() -> Result<Self> {
        let env: BTreeMap<String, String> = std::env::vars().collect();
        let home = match env.get(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(home) => PathBuf::from(home),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    config::invalid(format!(
                        "Cannot determine home directory; set {HOME_ENV}"
                    ))
                })?
                .join(".stevedore"),
        };
        Self::load(home, env)
    }

    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.settings.driver = driver;
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.home.join(CACHE_DIR)
    }

    pub fn claims_dir(&self) -> PathBuf {
        self.home.join(CLAIMS_DIR)
    }

    pub fn credentials_dir(&self) -> PathBuf {
        self.home.join(CREDENTIALS_DIR)
    }

    /// Resolve a user-supplied path against the current directory, without
    /// Windows verbatim prefixes
    pub fn absolute(path: &Path) -> PathBuf {
        dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}
