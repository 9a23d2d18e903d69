//! Main orchestrator for bundle actions
//!
//! Per request:
//!
//! 1. Fetch the installation's claim. Install tolerates a missing claim;
//!    every other action fails with `PreconditionFailed` before anything
//!    else happens (no bundle loading, no backend call, no claim write).
//! 2. Resolve the bundle (cache, file, or the claim's snapshot).
//! 3. Load credential sets and assemble the action arguments. Only the
//!    credentials the bundle declares for the action are read from their
//!    sources, and every validation failure is listed at once.
//! 4. Build the invocation image when requested and missing (install only).
//! 5. Write an `underway` claim revision, then call the backend.
//! 6. Write the final claim revision whatever the outcome. A failed write
//!    here is reported as `TrackingFailed`, carrying the action error too
//!    when the action itself failed.

use crate::backend::{ActionArguments, Backend, BackendError};
use crate::build::BuildProvider;
use crate::cache::BundleCache;
use crate::claim::{Claim, ClaimStore, validate_name};
use crate::config::Config;
use crate::config::credentials::load_credential_sets;
use crate::error::{Result, StevedoreError, action};
use crate::progress::{ProgressReporter, SilentReporter};

use super::arguments::assemble;
use super::request::{ActionKind, ActionRequest};
use super::resolution::{ResolvedBundle, resolve_bundle};

pub struct ActionOrchestrator<'a> {
    config: &'a Config,
    backend: &'a dyn Backend,
    cache: &'a dyn BundleCache,
    claims: &'a dyn ClaimStore,
    builder: Option<&'a dyn BuildProvider>,
    progress: &'a dyn ProgressReporter,
}

static SILENT: SilentReporter = SilentReporter;

impl<'a> ActionOrchestrator<'a> {
    pub fn new(
        config: &'a Config,
        backend: &'a dyn Backend,
        cache: &'a dyn BundleCache,
        claims: &'a dyn ClaimStore,
    ) -> Self {
        Self {
            config,
            backend,
            cache,
            claims,
            builder: None,
            progress: &SILENT,
        }
    }

    pub fn with_builder(mut self, builder: &'a dyn BuildProvider) -> Self {
        self.builder = Some(builder);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Run one action and return the claim recorded for it
    pub fn execute(&self, request: &ActionRequest) -> Result<Claim> {
        let result = self.run(request);
        self.progress.finish();
        result
    }

    fn run(&self, request: &ActionRequest) -> Result<Claim> {
        let installation = request.installation.as_str();
        let action_name = request.action.name();
        validate_name(installation)?;

        self.progress.step(&format!("checking installation '{installation}'"));
        let previous = self.fetch_previous(request)?;

        self.progress.step("resolving bundle");
        let resolved = resolve_bundle(
            &request.source,
            request.insecure,
            self.backend,
            self.cache,
            previous.as_ref(),
        )?;
        self.progress.step("binding credentials and parameters");
        let credentials = load_credential_sets(self.config, &request.credential_sets)?;
        let args = assemble(
            request,
            &resolved,
            &credentials,
            &self.config.env,
            previous.as_ref(),
        )?;

        if request.build && request.action == ActionKind::Install {
            self.progress.step("checking invocation image");
            self.build_if_needed(&resolved)?;
        }

        let underway = Claim::begin(
            previous.as_ref(),
            installation,
            action_name,
            &resolved.bundle,
            &resolved.reference,
            args.parameters.clone(),
            args.credentials.keys().cloned().collect(),
        );
        // Nothing has run yet, so a failure here is a plain persistence error
        self.claims.create_claim(&underway)?;

        tracing::info!(
            installation,
            action = action_name,
            backend = self.backend.name(),
            bundle = %resolved.bundle.name,
            "running action"
        );
        self.progress.start_action(&format!(
            "{action_name} '{installation}' ({} {})",
            resolved.bundle.name, resolved.bundle.version
        ));
        let outcome = self.dispatch(&request.action, &args);

        let recorded = underway.finish(outcome.as_ref().map(|_| ()).map_err(ToString::to_string));
        let persisted = self.claims.create_claim(&recorded);

        match (outcome, persisted) {
            (Ok(()), Ok(())) => {
                tracing::info!(installation, action = action_name, "action succeeded");
                Ok(recorded)
            }
            (Err(backend_err), Ok(())) => {
                tracing::warn!(installation, action = action_name, error = %backend_err, "action failed");
                Err(action::action_failed(action_name, installation, backend_err))
            }
            (Ok(()), Err(persistence)) => {
                tracing::error!(installation, action = action_name, error = %persistence, "action succeeded but claim was not recorded");
                Err(action::tracking_failed(
                    action_name,
                    installation,
                    persistence,
                    None,
                ))
            }
            (Err(backend_err), Err(persistence)) => {
                tracing::error!(installation, action = action_name, error = %persistence, "action failed and claim was not recorded");
                Err(action::tracking_failed(
                    action_name,
                    installation,
                    persistence,
                    Some(action::action_failed(action_name, installation, backend_err)),
                ))
            }
        }
    }

    fn fetch_previous(&self, request: &ActionRequest) -> Result<Option<Claim>> {
        match self.claims.fetch_claim(&request.installation) {
            Ok(claim) => Ok(Some(claim)),
            Err(StevedoreError::ClaimNotFound { .. }) if !request.action.requires_claim() => {
                Ok(None)
            }
            Err(StevedoreError::ClaimNotFound { .. }) => Err(action::precondition_failed(
                request.action.name(),
                &request.installation,
            )),
            Err(e) => Err(e),
        }
    }

    fn build_if_needed(&self, resolved: &ResolvedBundle) -> Result<()> {
        let Some(builder) = self.builder else {
            return Ok(());
        };
        if builder.is_built(&resolved.bundle)? {
            tracing::debug!(bundle = %resolved.bundle.name, "invocation image already built");
            return Ok(());
        }
        let dir = resolved.dir.as_deref().ok_or_else(|| {
            action::build_failed(
                &resolved.bundle.name,
                "building requires a bundle file (--file) as build context",
            )
        })?;
        builder.build_invocation_image(&resolved.bundle, dir)
    }

    fn dispatch(&self, kind: &ActionKind, args: &ActionArguments) -> std::result::Result<(), BackendError> {
        match kind {
            ActionKind::Install => self.backend.install(args),
            ActionKind::Upgrade => self.backend.upgrade(args),
            ActionKind::Invoke(action) => self.backend.invoke(action, args),
            ActionKind::Uninstall => self.backend.uninstall(args),
        }
    }
}
