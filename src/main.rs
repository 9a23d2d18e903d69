//! Stevedore - CNAB bundle lifecycle manager
//!
//! Installs, upgrades, invokes and uninstalls CNAB bundles through a
//! pluggable invocation backend, recording the state of every installation
//! as a claim.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod build;
mod bundle;
mod cache;
mod claim;
mod cli;
mod commands;
mod common;
mod config;
mod error;
mod hash;
mod operations;
mod progress;

#[cfg(test)]
mod test_fixtures;

use cli::Cli;
use config::Config;
use error::StevedoreError;

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "STEVEDORE_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "stevedore=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(driver) = cli.driver {
        config = config.with_driver(driver);
    }
    tracing::debug!(home = %config.home.display(), driver = %config.settings.driver, "configuration loaded");
    commands::run(&config, cli.command)
}

fn report(err: StevedoreError) {
    let stale = err.is_tracking_failure();
    eprintln!("{:?}", miette::Report::new(err));
    if stale {
        eprintln!(
            "{}",
            console::Style::new()
                .yellow()
                .bold()
                .apply_to("warning: installation tracking may be stale")
        );
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        report(e);
        std::process::exit(1);
    }
}
