//! Bundle definition (bundle.json)
//!
//! A bundle is immutable once loaded. The orchestrator and the backends share
//! it read-only behind an `Arc`.
//!
//! ```json
//! {
//!   "name": "example",
//!   "version": "0.1.0",
//!   "invocationImages": [
//!     { "imageType": "docker", "image": "example/installer:0.1.0", "contentDigest": "sha256:..." }
//!   ],
//!   "credentials": { "kubeconfig": { "path": "/root/.kube/config" } },
//!   "parameters": { "region": { "type": "string", "default": "eu-north-1" } },
//!   "actions": { "logs": { "modifies": false } }
//! }
//! ```

pub mod load;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use load::{load_bundle_file, read_bundle_file};

pub const ACTION_INSTALL: &str = "install";
pub const ACTION_UPGRADE: &str = "upgrade";
pub const ACTION_UNINSTALL: &str = "uninstall";

/// Actions every bundle supports without declaring them
pub const BUILTIN_ACTIONS: [&str; 3] = [ACTION_INSTALL, ACTION_UPGRADE, ACTION_UNINSTALL];

/// Image type the containerized backend can run
pub const DOCKER_IMAGE_TYPE: &str = "docker";

fn default_true() -> bool {
    true
}

fn default_image_type() -> String {
    DOCKER_IMAGE_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invocation_images: Vec<InvocationImage>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub credentials: BTreeMap<String, Credential>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, Action>,

    /// Mixin-provided helper steps the bundle's actions delegate to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationImage {
    #[serde(default = "default_image_type")]
    pub image_type: String,

    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
}

impl InvocationImage {
    /// Image reference to run, pinned by digest when one is declared
    pub fn reference(&self) -> String {
        match &self.content_digest {
            Some(digest) => format!("{}@{}", self.image, digest),
            None => self.image.clone(),
        }
    }
}

/// Where a credential or parameter value is injected into the invocation image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(flatten)]
    pub location: Location,

    #[serde(default = "default_true")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apply_to: Vec<String>,
}

impl Credential {
    pub fn applies_to(&self, action: &str) -> bool {
        applies(&self.apply_to, action)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
}

impl ParameterType {
    /// Convert a raw command-line value into a typed JSON value
    pub fn coerce(self, raw: &str) -> Result<serde_json::Value, String> {
        match self {
            ParameterType::String => Ok(serde_json::Value::String(raw.to_string())),
            ParameterType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(serde_json::Value::from)
                .map_err(|_| format!("'{raw}' is not an integer")),
            ParameterType::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .ok_or_else(|| format!("'{raw}' is not a number")),
            ParameterType::Boolean => match raw.trim() {
                "true" => Ok(serde_json::Value::Bool(true)),
                "false" => Ok(serde_json::Value::Bool(false)),
                _ => Err(format!("'{raw}' is not a boolean")),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(rename = "type", default)]
    pub kind: ParameterType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default = "default_true")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apply_to: Vec<String>,
}

impl Parameter {
    pub fn applies_to(&self, action: &str) -> bool {
        applies(&self.apply_to, action)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub modifies: bool,

    #[serde(default)]
    pub stateless: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn applies(apply_to: &[String], action: &str) -> bool {
    apply_to.is_empty() || apply_to.iter().any(|a| a == action)
}

impl Bundle {
    /// Starter definition written by `stevedore create`
    pub fn template(name: &str) -> Self {
        let mut actions = BTreeMap::new();
        actions.insert(
            "status".to_string(),
            Action {
                modifies: false,
                stateless: false,
                description: Some("Print the status of the installation".to_string()),
            },
        );

        Self {
            name: name.to_string(),
            version: "0.1.0".to_string(),
            description: Some(format!("The {name} bundle")),
            invocation_images: vec![InvocationImage {
                image_type: DOCKER_IMAGE_TYPE.to_string(),
                image: format!("{name}-installer:0.1.0"),
                content_digest: None,
            }],
            credentials: BTreeMap::new(),
            parameters: BTreeMap::new(),
            actions,
            mixins: Vec::new(),
        }
    }

    /// True when `action` is one of install/upgrade/uninstall
    pub fn is_builtin_action(action: &str) -> bool {
        BUILTIN_ACTIONS.contains(&action)
    }

    /// True when the bundle can run `action`, either built in or declared
    pub fn supports_action(&self, action: &str) -> bool {
        Self::is_builtin_action(action) || self.actions.contains_key(action)
    }

    /// The first invocation image the containerized backend can run
    pub fn docker_image(&self) -> Option<&InvocationImage> {
        self.invocation_images
            .iter()
            .find(|image| image.image_type == DOCKER_IMAGE_TYPE)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
