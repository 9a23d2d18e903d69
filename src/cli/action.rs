use std::path::PathBuf;

use clap::{Args, Parser};

/// Flags shared by install, upgrade, invoke and uninstall
#[derive(Args, Debug, Clone, Default)]
pub struct ActionArgs {
    /// Installation name (defaults to the bundle's name)
    pub installation: Option<String>,

    /// Bundle definition file
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Resolve the bundle through the cache under this tag
    #[arg(long, short = 't', value_name = "TAG")]
    pub tag: Option<String>,

    /// Skip bundle verification (unpinned images, digest mismatch)
    #[arg(long)]
    pub insecure: bool,

    /// Parameter value, repeatable
    #[arg(long = "param", short = 'p', value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Credential set name or file, repeatable; later sets win
    #[arg(long = "cred", short = 'c', value_name = "SET")]
    pub credential_sets: Vec<String>,

    /// Kill the action if it runs longer than this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

/// Arguments for the install command
#[derive(Parser, Debug, Clone)]
pub struct InstallArgs {
    #[command(flatten)]
    pub action: ActionArgs,

    /// Build the invocation image first when it is not present
    #[arg(long)]
    pub build: bool,
}

/// Arguments for the upgrade command
#[derive(Parser, Debug, Clone)]
pub struct UpgradeArgs {
    #[command(flatten)]
    pub action: ActionArgs,
}

/// Arguments for the invoke command
#[derive(Parser, Debug, Clone)]
pub struct InvokeArgs {
    /// Custom action declared by the bundle
    #[arg(long = "action", short = 'a', value_name = "ACTION")]
    pub custom_action: String,

    #[command(flatten)]
    pub action: ActionArgs,
}

/// Arguments for the uninstall command
#[derive(Parser, Debug, Clone)]
pub struct UninstallArgs {
    #[command(flatten)]
    pub action: ActionArgs,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}
