//! Test doubles and fixtures shared by unit tests.
//!
//! - [`RecordingBackend`]: records every backend call, optionally failing
//! - [`MemoryClaimStore`]: claim store with injectable write failures
//! - [`RecordingBuilder`]: build provider that counts builds
//! - [`RecordingCache`]: bundle cache in a fixed directory that counts lookups
//!
//! # Usage
//!
//! ```ignore
//! let backend = RecordingBackend::failing(|| BackendError::NonZeroExit { code: 1 });
//! let claims = MemoryClaimStore::new();
//! claims.fail_writes_from(2);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::backend::{ActionArguments, Backend, BackendError};
use crate::build::BuildProvider;
use crate::bundle::{self, Bundle, Credential, Location, Parameter, ParameterType};
use crate::cache::{BundleCache, tag_key};
use crate::claim::{Claim, ClaimStore};
use crate::config::Config;
use crate::error::{Result, cache, claim};

type FailureFn = Box<dyn Fn() -> BackendError + Send + Sync>;

/// Backend that records calls instead of running anything
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<String>>,
    last_args: Mutex<Option<ActionArguments>>,
    bundle: Option<Bundle>,
    failure: Option<FailureFn>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every action call fails with the error `failure` builds
    pub fn failing(failure: impl Fn() -> BackendError + Send + Sync + 'static) -> Self {
        Self {
            failure: Some(Box::new(failure)),
            ..Self::default()
        }
    }

    /// `load_bundle` returns `bundle` instead of reading the file
    pub fn with_bundle(mut self, bundle: Bundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// # Panics
    ///
    /// Panics if the call log lock is poisoned.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log lock").clone()
    }

    pub fn load_count(&self) -> usize {
        self.calls().iter().filter(|c| *c == "load_bundle").count()
    }

    /// # Panics
    ///
    /// Panics if the arguments lock is poisoned.
    pub fn last_args(&self) -> Option<ActionArguments> {
        self.last_args.lock().expect("arguments lock").clone()
    }

    fn record(&self, call: String, args: &ActionArguments) -> std::result::Result<(), BackendError> {
        self.calls.lock().expect("call log lock").push(call);
        *self.last_args.lock().expect("arguments lock") = Some(args.clone());
        match &self.failure {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn load_bundle(&self, path: &Path, insecure: bool) -> Result<Bundle> {
        self.calls
            .lock()
            .expect("call log lock")
            .push("load_bundle".to_string());
        match &self.bundle {
            Some(bundle) => Ok(bundle.clone()),
            None => bundle::load_bundle_file(path, insecure),
        }
    }

    fn install(&self, args: &ActionArguments) -> std::result::Result<(), BackendError> {
        self.record("install".to_string(), args)
    }

    fn upgrade(&self, args: &ActionArguments) -> std::result::Result<(), BackendError> {
        self.record("upgrade".to_string(), args)
    }

    fn invoke(&self, action: &str, args: &ActionArguments) -> std::result::Result<(), BackendError> {
        self.record(format!("invoke:{action}"), args)
    }

    fn uninstall(&self, args: &ActionArguments) -> std::result::Result<(), BackendError> {
        self.record("uninstall".to_string(), args)
    }
}

/// In-memory claim store keeping every revision
#[derive(Debug, Default)]
pub struct MemoryClaimStore {
    claims: Mutex<BTreeMap<String, Vec<Claim>>>,
    corrupt: Mutex<BTreeSet<String>>,
    writes: AtomicUsize,
    fail_from: AtomicUsize,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`th write (1-based) and every later one fail
    pub fn fail_writes_from(&self, n: usize) {
        self.fail_from.store(n, Ordering::SeqCst);
    }

    /// Make `fetch_claim(name)` report a corrupt record
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn corrupt(&self, name: &str) {
        self.corrupt
            .lock()
            .expect("corrupt set lock")
            .insert(name.to_string());
    }

    /// Number of attempted writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ClaimStore for MemoryClaimStore {
    fn fetch_claim(&self, name: &str) -> Result<Claim> {
        if self.corrupt.lock().expect("corrupt set lock").contains(name) {
            return Err(claim::corrupt(name, "expected value at line 1 column 1"));
        }
        self.claims
            .lock()
            .expect("claims lock")
            .get(name)
            .and_then(|revisions| revisions.last().cloned())
            .ok_or_else(|| claim::not_found(name))
    }

    fn create_claim(&self, record: &Claim) -> Result<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_from = self.fail_from.load(Ordering::SeqCst);
        if fail_from != 0 && n >= fail_from {
            return Err(claim::write_failed(&record.name, "simulated write failure"));
        }
        self.claims
            .lock()
            .expect("claims lock")
            .entry(record.name.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn list_claims(&self) -> Result<Vec<Claim>> {
        Ok(self
            .claims
            .lock()
            .expect("claims lock")
            .values()
            .filter_map(|revisions| revisions.last().cloned())
            .collect())
    }

    fn claim_history(&self, name: &str) -> Result<Vec<Claim>> {
        self.claims
            .lock()
            .expect("claims lock")
            .get(name)
            .cloned()
            .ok_or_else(|| claim::not_found(name))
    }
}

/// Build provider that only counts builds
#[derive(Debug, Default)]
pub struct RecordingBuilder {
    built: bool,
    builds: AtomicUsize,
}

impl RecordingBuilder {
    pub fn new(built: bool) -> Self {
        Self {
            built,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl BuildProvider for RecordingBuilder {
    fn is_built(&self, _bundle: &Bundle) -> Result<bool> {
        Ok(self.built)
    }

    fn build_invocation_image(&self, _bundle: &Bundle, _dir: &Path) -> Result<()> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Bundle cache writing flat files into one directory
///
/// `cache_dir` returns the configured directory as is.
#[derive(Debug)]
pub struct RecordingCache {
    dir: PathBuf,
    finds: AtomicUsize,
    stores: AtomicUsize,
}

impl RecordingCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            finds: AtomicUsize::new(0),
            stores: AtomicUsize::new(0),
        }
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }

    fn path_for(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{}.json", tag_key(tag)))
    }
}

impl BundleCache for RecordingCache {
    fn find_bundle(&self, tag: &str) -> Result<Option<PathBuf>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        let path = self.path_for(tag);
        Ok(path.is_file().then_some(path))
    }

    fn store_bundle(&self, tag: &str, bundle: &Bundle) -> Result<PathBuf> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        let path = self.path_for(tag);
        let json = bundle
            .to_json()
            .map_err(|e| cache::operation_failed(e.to_string()))?;
        std::fs::create_dir_all(&self.dir).map_err(|e| cache::operation_failed(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| cache::operation_failed(e.to_string()))?;
        Ok(path)
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        Ok(self.dir.clone())
    }
}

/// The `example` bundle: pinned image, credential `name` injected as `BLAH`,
/// an optional `replicas` parameter and a custom `logs` action.
pub fn example_bundle() -> Bundle {
    let mut bundle = Bundle::template("example");
    for image in &mut bundle.invocation_images {
        image.content_digest = Some("sha256:0123456789abcdef".to_string());
    }
    bundle.credentials.insert(
        "name".to_string(),
        Credential {
            location: Location {
                env: Some("BLAH".to_string()),
                path: None,
            },
            required: true,
            description: None,
            apply_to: Vec::new(),
        },
    );
    bundle.parameters.insert(
        "replicas".to_string(),
        Parameter {
            kind: ParameterType::Integer,
            default: Some(serde_json::json!(1)),
            required: true,
            destination: None,
            description: None,
            apply_to: Vec::new(),
        },
    );
    bundle
        .actions
        .insert("logs".to_string(), bundle::Action::default());
    bundle
}

/// Write `bundle` to `<dir>/bundle.json`
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_bundle(dir: &Path, bundle: &Bundle) -> PathBuf {
    let path = dir.join("bundle.json");
    std::fs::write(&path, bundle.to_json().expect("serialize bundle")).expect("write bundle");
    path
}

/// Write a credential set mapping each credential to an environment variable
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_credential_set(config: &Config, set: &str, env_sources: &[(&str, &str)]) -> PathBuf {
    let dir = config.credentials_dir();
    std::fs::create_dir_all(&dir).expect("create credentials dir");
    let mut yaml = format!("name: {set}\ncredentials:\n");
    for (name, var) in env_sources {
        yaml.push_str(&format!("  - name: {name}\n    source:\n      env: {var}\n"));
    }
    let path = dir.join(format!("{set}.yaml"));
    std::fs::write(&path, yaml).expect("write credential set");
    path
}
