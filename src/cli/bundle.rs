use std::path::PathBuf;

use clap::Parser;

/// Arguments for the create command
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Bundle name
    pub name: String,

    /// Directory to write bundle.json and the Dockerfile into
    #[arg(long, short = 'd', value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
}

/// Arguments for the build command
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Bundle definition file; its directory is the build context
    #[arg(long, short = 'f', value_name = "FILE", default_value = "bundle.json")]
    pub file: PathBuf,
}

/// Arguments for the archive command
#[derive(Parser, Debug, Clone)]
pub struct ArchiveArgs {
    /// Output file for the bundle definition
    pub output: PathBuf,

    /// Bundle definition file to export
    #[arg(long, short = 'f', value_name = "FILE", conflicts_with = "tag")]
    pub file: Option<PathBuf>,

    /// Cached tag to export
    #[arg(long, short = 't', value_name = "TAG")]
    pub tag: Option<String>,

    /// Skip bundle verification
    #[arg(long)]
    pub insecure: bool,
}
