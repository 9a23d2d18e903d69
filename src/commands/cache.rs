use crate::cache::{BundleCache, CacheStats, FsBundleCache, list_entries};
use crate::cli::{CacheArgs, CacheSubcommand};
use crate::config::Config;
use crate::error::Result;

pub fn run(config: &Config, args: CacheArgs) -> Result<()> {
    let cache = FsBundleCache::new(config.cache_dir());
    match args.command {
        Some(CacheSubcommand::List) => list_cached_bundles(&cache),
        None => show_cache_stats(&cache),
    }
}

fn print_stats(cache: &FsBundleCache) -> Result<CacheStats> {
    let entries = list_entries(cache.root())?;
    let stats = CacheStats::from_entries(&entries);

    println!("Cache Statistics:");
    println!("  Location: {}", cache.cache_dir()?.display());
    println!("  Tags: {}", stats.entries);
    println!("  Size: {}", stats.formatted_size());
    Ok(stats)
}

fn show_cache_stats(cache: &FsBundleCache) -> Result<()> {
    let stats = print_stats(cache)?;

    if stats.entries == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'stevedore cache list' to list cached tags.");
    }
    Ok(())
}

fn list_cached_bundles(cache: &FsBundleCache) -> Result<()> {
    print_stats(cache)?;
    println!();

    let entries = list_entries(cache.root())?;
    if entries.is_empty() {
        println!("No cached bundles.");
        return Ok(());
    }

    println!("Cached bundles ({}):", entries.len());
    for entry in &entries {
        println!("  {} ({})", entry.tag, entry.formatted_size());
        println!("    Path: {}", entry.path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::example_bundle;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_cache_commands_on_empty_and_filled_cache() {
        let temp = TempDir::new().unwrap();
        let config = Config::new(temp.path(), BTreeMap::new());
        assert!(run(&config, CacheArgs { command: None }).is_ok());

        FsBundleCache::new(config.cache_dir())
            .store_bundle("example:v1", &example_bundle())
            .unwrap();
        assert!(
            run(
                &config,
                CacheArgs {
                    command: Some(CacheSubcommand::List)
                }
            )
            .is_ok()
        );
    }
}
