//! Install, upgrade, invoke and uninstall commands
//!
//! Turns CLI flags into an [`ActionRequest`] and runs it through the
//! orchestrator with the configured backend, cache and claim store.
//!
//! Bundle source selection:
//! - `--tag` resolves through the cache, loading `--file` on a miss
//! - `--file` alone loads that file directly
//! - neither: install reads `./bundle.json`, every other action reuses the
//!   bundle recorded in the installation's claim

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use console::Style;

use crate::backend::backend_for;
use crate::build::builder_for;
use crate::bundle::read_bundle_file;
use crate::cache::{BundleCache, FsBundleCache};
use crate::claim::{Claim, FileClaimStore};
use crate::cli::{ActionArgs, InstallArgs, InvokeArgs, UninstallArgs, UpgradeArgs};
use crate::config::Config;
use crate::error::{Result, bundle};
use crate::operations::action::{ActionKind, ActionOrchestrator, ActionRequest, BundleSource};
use crate::progress;

/// Bundle file used when neither `--file` nor `--tag` is given
pub const DEFAULT_BUNDLE_FILE: &str = "bundle.json";

pub fn install(config: &Config, args: InstallArgs) -> Result<()> {
    execute(config, ActionKind::Install, args.action, args.build)
}

pub fn upgrade(config: &Config, args: UpgradeArgs) -> Result<()> {
    execute(config, ActionKind::Upgrade, args.action, false)
}

pub fn invoke(config: &Config, args: InvokeArgs) -> Result<()> {
    execute(
        config,
        ActionKind::Invoke(args.custom_action),
        args.action,
        false,
    )
}

pub fn uninstall(config: &Config, args: UninstallArgs) -> Result<()> {
    execute(config, ActionKind::Uninstall, args.action, false)
}

fn execute(config: &Config, kind: ActionKind, args: ActionArgs, build: bool) -> Result<()> {
    let cache = FsBundleCache::new(config.cache_dir());
    let claims = FileClaimStore::new(config.claims_dir());
    let backend = backend_for(config);
    let builder = builder_for(config);
    let reporter = progress::reporter();

    let request = build_request(kind, args, build, &cache)?;
    tracing::debug!(?request, driver = %config.settings.driver, "action request");

    let claim = ActionOrchestrator::new(config, backend.as_ref(), &cache, &claims)
        .with_builder(builder.as_ref())
        .with_progress(reporter.as_ref())
        .execute(&request)?;

    print_outcome(&claim);
    Ok(())
}

/// Build the orchestrator request for `kind` from CLI flags
pub fn build_request(
    kind: ActionKind,
    args: ActionArgs,
    build: bool,
    cache: &dyn BundleCache,
) -> Result<ActionRequest> {
    let source = bundle_source(&kind, args.tag, args.file);
    let installation = match args.installation {
        Some(name) => name,
        None => default_installation_name(&source, cache)?,
    };

    let parameters: BTreeMap<String, String> = args.params.into_iter().collect();

    let mut request = ActionRequest::new(installation, kind, source).insecure(args.insecure);
    request.parameters = parameters;
    request.credential_sets = args.credential_sets;
    request.build = build;
    request.timeout = args.timeout.map(Duration::from_secs);
    Ok(request)
}

fn bundle_source(kind: &ActionKind, tag: Option<String>, file: Option<PathBuf>) -> BundleSource {
    match (tag, file) {
        (Some(tag), file) => BundleSource::Tag { tag, file },
        (None, Some(file)) => BundleSource::File(file),
        (None, None) if *kind == ActionKind::Install => {
            BundleSource::File(PathBuf::from(DEFAULT_BUNDLE_FILE))
        }
        (None, None) => BundleSource::Claim,
    }
}

/// Installation name used when none is given: the bundle's own name
fn default_installation_name(source: &BundleSource, cache: &dyn BundleCache) -> Result<String> {
    let path = match source {
        BundleSource::File(path) => path.clone(),
        BundleSource::Tag { tag, file } => match cache.find_bundle(tag)? {
            Some(cached) => cached,
            None => file.clone().ok_or_else(|| bundle::tag_not_cached(tag))?,
        },
        BundleSource::Claim => PathBuf::from(DEFAULT_BUNDLE_FILE),
    };
    peek_bundle_name(&path)
}

fn peek_bundle_name(path: &Path) -> Result<String> {
    read_bundle_file(path).map(|bundle| bundle.name)
}

fn print_outcome(claim: &Claim) {
    let state = claim.state();
    println!(
        "{} {} of '{}' succeeded (revision {}, now {})",
        Style::new().green().bold().apply_to("✓"),
        claim.result.action,
        claim.name,
        claim.revision,
        crate::common::display_utils::state_style(state).apply_to(state)
    );
}
