//! Bundle authoring commands: create, build and archive

use std::path::{Path, PathBuf};

use console::Style;

use crate::build::{DOCKERFILE, builder_for};
use crate::bundle::load::digest_path;
use crate::bundle::{Bundle, load_bundle_file, read_bundle_file};
use crate::cache::{BundleCache, FsBundleCache};
use crate::claim::validate_name;
use crate::cli::{ArchiveArgs, BuildArgs, CreateArgs};
use crate::common::fs::write_atomic;
use crate::config::Config;
use crate::error::{Result, bundle, fs};
use crate::hash;

use super::action::DEFAULT_BUNDLE_FILE;

/// Entry point script the starter Dockerfile installs
pub const RUN_SCRIPT: &str = "run";

const DOCKERFILE_TEMPLATE: &str = "FROM debian:stable-slim\n\
COPY run /cnab/app/run\n\
RUN chmod +x /cnab/app/run\n\
CMD [\"/cnab/app/run\"]\n";

const RUN_TEMPLATE: &str = "#!/bin/sh\n\
set -e\n\
\n\
case \"$CNAB_ACTION\" in\n\
  install) echo \"Installing $CNAB_INSTALLATION_NAME\" ;;\n\
  upgrade) echo \"Upgrading $CNAB_INSTALLATION_NAME\" ;;\n\
  uninstall) echo \"Uninstalling $CNAB_INSTALLATION_NAME\" ;;\n\
  status) echo \"$CNAB_INSTALLATION_NAME is running $CNAB_BUNDLE_NAME $CNAB_BUNDLE_VERSION\" ;;\n\
  *) echo \"Unknown action: $CNAB_ACTION\" >&2; exit 1 ;;\n\
esac\n";

/// Write a starter bundle into `args.dir`
pub fn create(args: CreateArgs) -> Result<()> {
    validate_name(&args.name)?;

    let bundle_path = args.dir.join(DEFAULT_BUNDLE_FILE);
    if bundle_path.exists() {
        return Err(fs::write_failed(
            bundle_path.display().to_string(),
            "file already exists",
        ));
    }

    let bundle = Bundle::template(&args.name);
    let json = bundle
        .to_json()
        .map_err(|e| fs::write_failed(bundle_path.display().to_string(), e.to_string()))?;
    write_file(&bundle_path, json.as_bytes())?;

    for (file, content) in [(DOCKERFILE, DOCKERFILE_TEMPLATE), (RUN_SCRIPT, RUN_TEMPLATE)] {
        let path = args.dir.join(file);
        if path.exists() {
            tracing::debug!(path = %path.display(), "keeping existing file");
            continue;
        }
        write_file(&path, content.as_bytes())?;
    }

    println!(
        "{} Created bundle '{}' in {}",
        Style::new().green().bold().apply_to("✓"),
        bundle.name,
        args.dir.display()
    );
    println!("  Build its invocation image with 'stevedore build --file {}'", bundle_path.display());
    Ok(())
}

/// Build the invocation image of a bundle file
pub fn build(config: &Config, args: BuildArgs) -> Result<()> {
    let bundle = read_bundle_file(&args.file)?;
    let context = context_dir(&args.file);
    builder_for(config).build_invocation_image(&bundle, &context)?;

    println!(
        "{} Built invocation image for '{}'",
        Style::new().green().bold().apply_to("✓"),
        bundle.name
    );
    Ok(())
}

/// Export a bundle definition with a digest sidecar next to it
pub fn archive(config: &Config, args: ArchiveArgs) -> Result<()> {
    let bundle = match (&args.tag, &args.file) {
        (Some(tag), _) => {
            let cache = FsBundleCache::new(config.cache_dir());
            let path = cache
                .find_bundle(tag)?
                .ok_or_else(|| bundle::tag_not_cached(tag))?;
            load_bundle_file(&path, args.insecure)?
        }
        (None, file) => {
            let path = file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_FILE));
            load_bundle_file(&path, args.insecure)?
        }
    };

    let digest = write_archive(&bundle, &args.output)?;
    println!(
        "{} Archived '{}' {} to {}",
        Style::new().green().bold().apply_to("✓"),
        bundle.name,
        bundle.version,
        args.output.display()
    );
    println!("  {digest}");
    Ok(())
}

/// Write `bundle` to `output` and its digest to `<output>.digest`
pub fn write_archive(bundle: &Bundle, output: &Path) -> Result<String> {
    let json = bundle
        .to_json()
        .map_err(|e| fs::write_failed(output.display().to_string(), e.to_string()))?;
    write_file(output, json.as_bytes())?;

    let digest = hash::hash_bytes(json.as_bytes());
    write_file(&digest_path(output), digest.as_bytes())?;
    Ok(digest)
}

fn context_dir(bundle_file: &Path) -> PathBuf {
    match bundle_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic(path, content).map_err(|e| fs::write_failed(path.display().to_string(), e.to_string()))
}
