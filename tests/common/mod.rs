//! Common test utilities for Stevedore integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Bundle with a pinned image, one env credential, an integer parameter and
/// a custom `logs` action
pub const EXAMPLE_BUNDLE: &str = r#"{
  "name": "example",
  "version": "0.1.0",
  "invocationImages": [
    { "imageType": "docker", "image": "example/installer:0.1.0", "contentDigest": "sha256:0123456789abcdef" }
  ],
  "credentials": { "name": { "env": "BLAH" } },
  "parameters": { "replicas": { "type": "integer", "default": 1 } },
  "actions": { "logs": { "modifies": false } }
}"#;

/// Credential set binding `name` to the `EXAMPLE_NAME` environment variable
pub const CI_CREDENTIALS: &str =
    "name: ci\ncredentials:\n  - name: name\n    source:\n      env: EXAMPLE_NAME\n";

/// An isolated stevedore home plus a working directory
pub struct TestHome {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Value of STEVEDORE_HOME
    pub home: PathBuf,
    /// Current directory for commands
    pub work: PathBuf,
}

#[allow(dead_code)]
impl TestHome {
    /// Home configured for the debug driver, with the `ci` credential set
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let home = temp.path().join("home");
        let work = temp.path().join("work");
        std::fs::create_dir_all(home.join("credentials")).expect("Failed to create home");
        std::fs::create_dir_all(&work).expect("Failed to create work dir");
        std::fs::write(home.join("config.yaml"), "driver: debug\n")
            .expect("Failed to write config.yaml");
        std::fs::write(home.join("credentials").join("ci.yaml"), CI_CREDENTIALS)
            .expect("Failed to write credential set");
        Self { temp, home, work }
    }

    /// Write `content` under the working directory
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.work.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Write the example bundle as `bundle.json` in the working directory
    pub fn write_example_bundle(&self) -> PathBuf {
        self.write_file("bundle.json", EXAMPLE_BUNDLE)
    }

    /// Path of the current claim for `name`
    pub fn claim_path(&self, name: &str) -> PathBuf {
        self.home.join("claims").join(format!("{name}.json"))
    }

    /// Current claim for `name` as JSON
    pub fn read_claim(&self, name: &str) -> serde_json::Value {
        read_json(&self.claim_path(name))
    }

    /// Number of revisions in the history log of `name`
    pub fn history_len(&self, name: &str) -> usize {
        let path = self
            .home
            .join("claims")
            .join(format!("{name}.history.jsonl"));
        std::fs::read_to_string(path)
            .map(|s| s.lines().filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0)
    }

    /// Stevedore command isolated to this home, run from the working directory
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("stevedore").expect("stevedore binary");
        cmd.current_dir(&self.work)
            .env("STEVEDORE_HOME", &self.home)
            .env("EXAMPLE_NAME", "world")
            .env_remove("STEVEDORE_LOG")
            .env_remove("KUBECONFIG");
        cmd
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
pub fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("Failed to read file");
    serde_json::from_str(&content).expect("Failed to parse JSON")
}
