//! Credential sets
//!
//! A credential set maps the credential names a bundle declares to where
//! their values come from:
//!
//! ```yaml
//! name: ci
//! credentials:
//!   - name: kubeconfig
//!     source:
//!       path: /home/me/.kube/config
//!   - name: token
//!     source:
//!       env: TOKEN
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Config;
use crate::error::{Result, credentials};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    pub name: String,

    #[serde(default)]
    pub credentials: Vec<CredentialStrategy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStrategy {
    pub name: String,
    pub source: CredentialSource,
}

/// Where a credential value comes from; exactly one field is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Where each credential name comes from, after merging credential sets
pub type CredentialSources = BTreeMap<String, CredentialSource>;

impl CredentialSource {
    /// Read the value this source points at
    pub fn resolve(&self, credential: &str, env: &BTreeMap<String, String>) -> Result<String> {
        match (&self.env, &self.path, &self.value) {
            (Some(var), None, None) => env.get(var).cloned().ok_or_else(|| {
                credentials::source_failed(
                    credential,
                    format!("environment variable {var} is not set"),
                )
            }),
            (None, Some(path), None) => fs::read_to_string(path).map_err(|e| {
                credentials::source_failed(credential, format!("{}: {e}", path.display()))
            }),
            (None, None, Some(value)) => Ok(value.clone()),
            _ => Err(credentials::source_failed(
                credential,
                "source must set exactly one of env, path or value",
            )),
        }
    }
}

impl CredentialSet {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| credentials::parse_failed(path.display().to_string(), e.to_string()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| credentials::parse_failed(path.display().to_string(), e.to_string()))
    }
}

/// Locate a credential set given by name (`<home>/credentials/<name>.yaml`)
/// or by path
pub fn find_credential_set(config: &Config, name_or_path: &str) -> Result<PathBuf> {
    let direct = Path::new(name_or_path);
    if direct.is_file() {
        return Ok(Config::absolute(direct));
    }

    let dir = config.credentials_dir();
    ["yaml", "yml"]
        .iter()
        .map(|ext| dir.join(format!("{name_or_path}.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| credentials::not_found(name_or_path))
}

/// Load credential sets in order; later sets win on conflicts
///
/// Sources are not read here. Only the credentials an action needs are
/// resolved, when its arguments are assembled.
pub fn load_credential_sets(config: &Config, sets: &[String]) -> Result<CredentialSources> {
    let mut sources = BTreeMap::new();
    for set in sets {
        let path = find_credential_set(config, set)?;
        let loaded = CredentialSet::load(&path)?;
        tracing::debug!(set = %loaded.name, path = %path.display(), "loaded credential set");
        sources.extend(loaded.credentials.into_iter().map(|c| (c.name, c.source)));
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StevedoreError;
    use tempfile::TempDir;

    const SET: &str = r"
name: ci
credentials:
  - name: name
    source:
      env: BLAH
  - name: region
    source:
      value: eu-north-1
";

    fn config(temp: &TempDir, env: &[(&str, &str)]) -> Config {
        Config::new(
            temp.path(),
            env.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    fn write_set(temp: &TempDir, name: &str, content: &str) -> PathBuf {
        let dir = temp.path().join(super::super::CREDENTIALS_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.yaml"));
        std::fs::write(&path, content).unwrap();
        path
    }

    fn resolve_all(cfg: &Config, sets: &[&str]) -> Result<BTreeMap<String, String>> {
        let sets: Vec<String> = sets.iter().map(|s| (*s).to_string()).collect();
        load_credential_sets(cfg, &sets)?
            .iter()
            .map(|(name, source)| Ok((name.clone(), source.resolve(name, &cfg.env)?)))
            .collect()
    }

    #[test]
    fn test_resolve_by_name() {
        let temp = TempDir::new().unwrap();
        write_set(&temp, "ci", SET);
        let cfg = config(&temp, &[("BLAH", "secret")]);

        let values = resolve_all(&cfg, &["ci"]).unwrap();
        assert_eq!(values["name"], "secret");
        assert_eq!(values["region"], "eu-north-1");
    }

    #[test]
    fn test_resolve_by_path() {
        let temp = TempDir::new().unwrap();
        let path = write_set(&temp, "ci", SET);
        let cfg = config(&temp, &[("BLAH", "secret")]);

        let values = resolve_all(&cfg, &[path.to_str().unwrap()]).unwrap();
        assert_eq!(values["name"], "secret");
    }

    #[test]
    fn test_file_source() {
        let temp = TempDir::new().unwrap();
        let secret = temp.path().join("token.txt");
        std::fs::write(&secret, "s3cr3t").unwrap();
        write_set(
            &temp,
            "files",
            &format!(
                "name: files\ncredentials:\n  - name: token\n    source:\n      path: {}\n",
                secret.display()
            ),
        );

        let values = resolve_all(&config(&temp, &[]), &["files"]).unwrap();
        assert_eq!(values["token"], "s3cr3t");
    }

    #[test]
    fn test_loading_does_not_read_sources() {
        let temp = TempDir::new().unwrap();
        write_set(&temp, "ci", SET);
        let cfg = config(&temp, &[]);

        let sources = load_credential_sets(&cfg, &["ci".to_string()]).unwrap();
        assert_eq!(sources.len(), 2);

        let err = sources["name"].resolve("name", &cfg.env).unwrap_err();
        assert!(matches!(err, StevedoreError::CredentialSourceFailed { .. }));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn test_ambiguous_source() {
        let source = CredentialSource {
            env: Some("A".to_string()),
            value: Some("b".to_string()),
            ..CredentialSource::default()
        };
        assert!(source.resolve("x", &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_unknown_set() {
        let temp = TempDir::new().unwrap();
        let err = load_credential_sets(&config(&temp, &[]), &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, StevedoreError::CredentialSetNotFound { .. }));
    }

    #[test]
    fn test_later_sets_win() {
        let temp = TempDir::new().unwrap();
        write_set(&temp, "ci", SET);
        write_set(
            &temp,
            "local",
            "name: local\ncredentials:\n  - name: region\n    source:\n      value: us-east-1\n",
        );
        let cfg = config(&temp, &[("BLAH", "secret")]);

        let values = resolve_all(&cfg, &["ci", "local"]).unwrap();
        assert_eq!(values["region"], "us-east-1");
        assert_eq!(values["name"], "secret");
    }
}
