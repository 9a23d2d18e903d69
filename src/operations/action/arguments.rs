//! Assembling and validating `ActionArguments`
//!
//! Validation collects every violation before failing so the user can fix
//! all of them in one go.

use std::collections::BTreeMap;

use super::request::{ActionKind, ActionRequest};
use super::resolution::ResolvedBundle;
use crate::backend::ActionArguments;
use crate::claim::Claim;
use crate::config::credentials::CredentialSources;
use crate::error::{Result, action};

/// Bind parameters and credentials for `request` against the resolved bundle
///
/// A parameter's value is, in order of preference: the value given on the
/// request, the value recorded in the previous claim, the bundle default.
/// Only credentials the bundle declares for this action are read from their
/// sources; `env` is the environment those sources resolve against.
pub fn assemble(
    request: &ActionRequest,
    resolved: &ResolvedBundle,
    credentials: &CredentialSources,
    env: &BTreeMap<String, String>,
    previous: Option<&Claim>,
) -> Result<ActionArguments> {
    let bundle = &resolved.bundle;
    let action_name = request.action.name();
    let mut violations = Vec::new();

    if let ActionKind::Invoke(custom) = &request.action {
        if !bundle.supports_action(custom) {
            violations.push(format!(
                "action '{custom}' is not declared by bundle '{}'",
                bundle.name
            ));
        }
    }

    for name in request.parameters.keys() {
        if !bundle.parameters.contains_key(name) {
            violations.push(format!("parameter '{name}' is not declared by the bundle"));
        }
    }

    let mut parameters = BTreeMap::new();
    for (name, declared) in &bundle.parameters {
        if !declared.applies_to(action_name) {
            continue;
        }
        let value = match request.parameters.get(name) {
            Some(raw) => match declared.kind.coerce(raw) {
                Ok(value) => Some(value),
                Err(reason) => {
                    violations.push(format!("parameter '{name}': {reason}"));
                    continue;
                }
            },
            None => previous
                .and_then(|p| p.parameters.get(name).cloned())
                .or_else(|| declared.default.clone()),
        };
        match value {
            Some(value) => {
                parameters.insert(name.clone(), value);
            }
            None if declared.required => violations.push(format!("missing parameter '{name}'")),
            None => {}
        }
    }

    let mut bound = BTreeMap::new();
    for (name, declared) in &bundle.credentials {
        if !declared.applies_to(action_name) {
            continue;
        }
        match credentials.get(name).map(|source| source.resolve(name, env)) {
            Some(Ok(value)) => {
                bound.insert(name.clone(), value);
            }
            Some(Err(e)) => violations.push(e.to_string()),
            None if declared.required => violations.push(format!("missing credential '{name}'")),
            None => {}
        }
    }

    if !violations.is_empty() {
        return Err(action::validation_failed(
            action_name,
            &request.installation,
            violations,
        ));
    }

    Ok(ActionArguments {
        installation: request.installation.clone(),
        action: action_name.to_string(),
        bundle: resolved.bundle.clone(),
        bundle_reference: resolved.reference.clone(),
        credentials: bound,
        parameters,
        mixins: bundle.mixins.clone(),
        insecure: request.insecure,
        cancellation: request.cancellation.clone(),
        timeout: request.timeout,
    })
}
