//! Command implementations for Stevedore CLI

pub mod action;
pub mod bundle;
pub mod cache;
pub mod completions;
pub mod instances;
pub mod version;

use crate::cli::{BundleCommand, Commands, InstanceCommand, InstancesCommand};
use crate::config::Config;
use crate::error::Result;

/// Dispatch a parsed command; aliases run exactly like their canonical form
pub fn run(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Bundle(args) => run_bundle(config, args.command),
        Commands::Alias(alias) => run_bundle(config, alias.into()),
        Commands::Instances(args) => match args.command {
            InstancesCommand::List(list_args) => instances::list(config, list_args),
        },
        Commands::List(args) => instances::list(config, args),
        Commands::Instance(args) => match args.command {
            InstanceCommand::Show(show_args) => instances::show(config, show_args),
        },
        Commands::Show(args) => instances::show(config, args),
        Commands::Cache(args) => cache::run(config, args),
        Commands::Completions(args) => completions::run(args),
        Commands::Version => version::run(config),
    }
}

fn run_bundle(config: &Config, command: BundleCommand) -> Result<()> {
    match command {
        BundleCommand::Create(args) => bundle::create(args),
        BundleCommand::Build(args) => bundle::build(config, args),
        BundleCommand::Install(args) => action::install(config, args),
        BundleCommand::Upgrade(args) => action::upgrade(config, args),
        BundleCommand::Invoke(args) => action::invoke(config, args),
        BundleCommand::Uninstall(args) => action::uninstall(config, args),
        BundleCommand::Archive(args) => bundle::archive(config, args),
    }
}
