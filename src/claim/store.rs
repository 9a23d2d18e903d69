//! Claim storage
//!
//! ```text
//! <home>/claims/
//! ├── example.json              # current claim, replaced by rename
//! └── example.history.jsonl     # every revision ever attempted, oldest first
//! ```
//!
//! A revision is appended to the history log before it replaces the current
//! record. An interrupted write can leave a history line with no matching
//! current record, never the reverse.
//!
//! Writes for one installation name are serialized through a per-name lock
//! held in the store itself. Different names never block each other.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::Claim;
use crate::common::fs::{append_line, write_atomic};
use crate::error::{Result, claim};

const CLAIM_EXTENSION: &str = "json";
const HISTORY_SUFFIX: &str = ".history.jsonl";

/// Contract between the orchestrator and claim storage
pub trait ClaimStore: Send + Sync {
    /// Current claim for `name`
    ///
    /// Fails with `ClaimNotFound` when the installation is unknown and with
    /// `ClaimCorrupt` when the stored record does not decode.
    fn fetch_claim(&self, name: &str) -> Result<Claim>;

    /// Write `claim` as the current record for its name
    ///
    /// Atomic: afterwards either the full new claim or the prior one is
    /// observable, never a partial record.
    fn create_claim(&self, claim: &Claim) -> Result<()>;

    /// All current claims, sorted by name
    fn list_claims(&self) -> Result<Vec<Claim>>;

    /// Every revision written for `name`, oldest first
    fn claim_history(&self, name: &str) -> Result<Vec<Claim>>;
}

/// Check that `name` can be used as an installation name
///
/// Names become file names, so path separators and leading dots are refused.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(claim::invalid_name(name))
    }
}

/// Claim store backed by one JSON file per installation
#[derive(Debug)]
pub struct FileClaimStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileClaimStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn claim_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{CLAIM_EXTENSION}"))
    }

    fn history_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{HISTORY_SUFFIX}"))
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    fn read_claim(&self, name: &str, path: &Path) -> Result<Claim> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                claim::not_found(name)
            } else {
                claim::read_failed(name, e.to_string())
            }
        })?;
        serde_json::from_str(&content).map_err(|e| claim::corrupt(name, e.to_string()))
    }
}

impl ClaimStore for FileClaimStore {
    fn fetch_claim(&self, name: &str) -> Result<Claim> {
        validate_name(name)?;
        self.read_claim(name, &self.claim_path(name))
    }

    fn create_claim(&self, record: &Claim) -> Result<()> {
        validate_name(&record.name)?;
        let name = record.name.as_str();

        let current = serde_json::to_string_pretty(record)
            .map_err(|e| claim::write_failed(name, e.to_string()))?;
        let line =
            serde_json::to_string(record).map_err(|e| claim::write_failed(name, e.to_string()))?;

        let lock = self.lock_for(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // The current record is published last, so it never runs ahead of
        // a write that reported failure
        append_line(&self.history_path(name), &line)
            .map_err(|e| claim::write_failed(name, format!("history log: {e}")))?;
        write_atomic(&self.claim_path(name), current.as_bytes())
            .map_err(|e| claim::write_failed(name, e.to_string()))?;

        tracing::debug!(
            installation = name,
            revision = record.revision,
            action = %record.result.action,
            status = %record.result.status,
            "claim written"
        );
        Ok(())
    }

    fn list_claims(&self) -> Result<Vec<Claim>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir)
            .map_err(|e| claim::read_failed(self.dir.display().to_string(), e.to_string()))?;

        let mut claims = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| claim::read_failed(self.dir.display().to_string(), e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CLAIM_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            claims.push(self.read_claim(name, &path)?);
        }

        claims.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(claims)
    }

    fn claim_history(&self, name: &str) -> Result<Vec<Claim>> {
        validate_name(name)?;
        let content = match fs::read_to_string(self.history_path(name)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // Claims written before the history log existed
                return self.fetch_claim(name).map(|c| vec![c]);
            }
            Err(e) => return Err(claim::read_failed(name, e.to_string())),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .map_err(|e| claim::corrupt(name, format!("history entry {}: {e}", i + 1)))
            })
            .collect()
    }
}
