//! CLI definitions using clap derive API
//!
//! Canonical commands are grouped (`bundle install`, `instances list`,
//! `instance show`). The top-level forms (`install`, `list`, ...) are aliases
//! that reuse the same argument types and the same examples with the
//! command prefix replaced.

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

use crate::config::Driver;

pub mod action;
pub mod bundle;
pub mod cache;
pub mod completions;
pub mod examples;
pub mod instances;

pub use action::{ActionArgs, InstallArgs, InvokeArgs, UninstallArgs, UpgradeArgs};
pub use bundle::{ArchiveArgs, BuildArgs, CreateArgs};
pub use cache::{CacheArgs, CacheSubcommand};
pub use completions::CompletionsArgs;
pub use instances::{ListArgs, ShowArgs};

/// Stevedore - CNAB bundle lifecycle manager
#[derive(Parser, Debug)]
#[command(
    name = "stevedore",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install, upgrade and uninstall CNAB bundles",
    long_about = "Stevedore runs the lifecycle actions of CNAB bundles through an invocation \
                  backend and records every installation's state as a claim.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  stevedore create example                 \x1b[90m# Start a new bundle\x1b[0m\n   \
                  stevedore install --cred ci              \x1b[90m# Install ./bundle.json\x1b[0m\n   \
                  stevedore upgrade example --cred ci      \x1b[90m# Upgrade an installation\x1b[0m\n   \
                  stevedore invoke example --action logs   \x1b[90m# Run a custom action\x1b[0m\n   \
                  stevedore uninstall example --cred ci    \x1b[90m# Uninstall\x1b[0m\n   \
                  stevedore list                           \x1b[90m# List installations\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Invocation driver (overrides config.yaml)
    #[arg(long, global = true, value_enum)]
    pub driver: Option<Driver>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, build, run and archive bundles
    Bundle(BundleArgs),

    /// List installations
    Instances(InstancesArgs),

    /// Inspect an installation
    Instance(InstanceArgs),

    #[command(flatten)]
    Alias(AliasCommand),

    /// List installations (alias of `instances list`)
    #[command(after_help = examples::LIST.alias())]
    List(ListArgs),

    /// Inspect an installation (alias of `instance show`)
    #[command(after_help = examples::SHOW.alias())]
    Show(ShowArgs),

    /// Inspect the bundle cache
    #[command(name = "cache")]
    Cache(CacheArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `bundle` command group
#[derive(Parser, Debug)]
pub struct BundleArgs {
    #[command(subcommand)]
    pub command: BundleCommand,
}

#[derive(Subcommand, Debug)]
pub enum BundleCommand {
    /// Create a new bundle
    #[command(after_help = examples::CREATE.canonical())]
    Create(CreateArgs),

    /// Build the bundle's invocation image
    #[command(after_help = examples::BUILD.canonical())]
    Build(BuildArgs),

    /// Install a bundle
    #[command(after_help = examples::INSTALL.canonical())]
    Install(InstallArgs),

    /// Upgrade an installation
    #[command(after_help = examples::UPGRADE.canonical())]
    Upgrade(UpgradeArgs),

    /// Run a custom action declared by the bundle
    #[command(after_help = examples::INVOKE.canonical())]
    Invoke(InvokeArgs),

    /// Uninstall an installation
    #[command(after_help = examples::UNINSTALL.canonical())]
    Uninstall(UninstallArgs),

    /// Export a bundle definition to a file
    #[command(after_help = examples::ARCHIVE.canonical())]
    Archive(ArchiveArgs),
}

/// Top-level shortcuts for the `bundle` commands
#[derive(Subcommand, Debug)]
pub enum AliasCommand {
    /// Create a new bundle (alias of `bundle create`)
    #[command(after_help = examples::CREATE.alias())]
    Create(CreateArgs),

    /// Build a bundle's invocation image (alias of `bundle build`)
    #[command(after_help = examples::BUILD.alias())]
    Build(BuildArgs),

    /// Install a bundle (alias of `bundle install`)
    #[command(after_help = examples::INSTALL.alias())]
    Install(InstallArgs),

    /// Upgrade an installation (alias of `bundle upgrade`)
    #[command(after_help = examples::UPGRADE.alias())]
    Upgrade(UpgradeArgs),

    /// Run a custom action (alias of `bundle invoke`)
    #[command(after_help = examples::INVOKE.alias())]
    Invoke(InvokeArgs),

    /// Uninstall an installation (alias of `bundle uninstall`)
    #[command(after_help = examples::UNINSTALL.alias())]
    Uninstall(UninstallArgs),

    /// Export a bundle definition (alias of `bundle archive`)
    #[command(after_help = examples::ARCHIVE.alias())]
    Archive(ArchiveArgs),
}

impl From<AliasCommand> for BundleCommand {
    fn from(alias: AliasCommand) -> Self {
        match alias {
            AliasCommand::Create(args) => BundleCommand::Create(args),
            AliasCommand::Build(args) => BundleCommand::Build(args),
            AliasCommand::Install(args) => BundleCommand::Install(args),
            AliasCommand::Upgrade(args) => BundleCommand::Upgrade(args),
            AliasCommand::Invoke(args) => BundleCommand::Invoke(args),
            AliasCommand::Uninstall(args) => BundleCommand::Uninstall(args),
            AliasCommand::Archive(args) => BundleCommand::Archive(args),
        }
    }
}

/// Arguments for the `instances` command group
#[derive(Parser, Debug)]
pub struct InstancesArgs {
    #[command(subcommand)]
    pub command: InstancesCommand,
}

#[derive(Subcommand, Debug)]
pub enum InstancesCommand {
    /// List installations
    #[command(after_help = examples::LIST.canonical())]
    List(ListArgs),
}

/// Arguments for the `instance` command group
#[derive(Parser, Debug)]
pub struct InstanceArgs {
    #[command(subcommand)]
    pub command: InstanceCommand,
}

#[derive(Subcommand, Debug)]
pub enum InstanceCommand {
    /// Inspect an installation
    #[command(after_help = examples::SHOW.canonical())]
    Show(ShowArgs),
}
