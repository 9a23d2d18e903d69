//! `instances list` and `instance show`

use console::Style;

use crate::claim::{ClaimStore, FileClaimStore, validate_name};
use crate::cli::{ListArgs, ShowArgs};
use crate::common::display_utils::{claim_summary_line, display_claim_detailed, revision_line};
use crate::config::Config;
use crate::error::{Result, fs};

/// Run list command
pub fn list(config: &Config, args: ListArgs) -> Result<()> {
    let store = FileClaimStore::new(config.claims_dir());
    let claims = store.list_claims()?;

    if args.json {
        return print_json(&claims);
    }

    if claims.is_empty() {
        println!("No installations.");
        return Ok(());
    }

    println!("Installations ({}):", claims.len());
    println!();
    for claim in &claims {
        println!("  {}", claim_summary_line(claim));
    }
    Ok(())
}

/// Run show command
pub fn show(config: &Config, args: ShowArgs) -> Result<()> {
    validate_name(&args.name)?;
    let store = FileClaimStore::new(config.claims_dir());
    let claim = store.fetch_claim(&args.name)?;

    if args.json {
        return if args.history {
            print_json(&store.claim_history(&args.name)?)
        } else {
            print_json(&claim)
        };
    }

    display_claim_detailed(&claim);

    if args.history {
        let history = store.claim_history(&args.name)?;
        println!();
        println!(
            "  {} ({} revisions)",
            Style::new().bold().apply_to("History:"),
            history.len()
        );
        for revision in &history {
            println!("  {}", revision_line(revision));
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| fs::write_failed("<stdout>", e.to_string()))?;
    println!("{json}");
    Ok(())
}
