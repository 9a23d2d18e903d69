/// Display helpers for installations and their claims.
///
/// Shared by `list`, `show` and the action commands so states and
/// timestamps render the same everywhere.
use chrono::{DateTime, Utc};
use console::Style;

use crate::backend::parameter_value_string;
use crate::claim::{Claim, InstallationState, Status};

/// Style for an installation state
pub fn state_style(state: InstallationState) -> Style {
    match state {
        InstallationState::Installed | InstallationState::Upgraded => Style::new().green(),
        InstallationState::Uninstalled | InstallationState::Unknown => Style::new().dim(),
        InstallationState::Failed(_) => Style::new().red().bold(),
        _ => Style::new().yellow(),
    }
}

/// Style for a claim result status
pub fn status_style(status: Status) -> Style {
    match status {
        Status::Success => Style::new().green(),
        Status::Failure => Style::new().red().bold(),
        Status::Underway => Style::new().yellow(),
    }
}

pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// One line per installation, as printed by `list`
pub fn claim_summary_line(claim: &Claim) -> String {
    let state = claim.state();
    format!(
        "{}  {} {}  {}  {}",
        Style::new().bold().yellow().apply_to(&claim.name),
        claim.bundle.name,
        claim.bundle.version,
        state_style(state).apply_to(state),
        Style::new().dim().apply_to(format_timestamp(&claim.modified)),
    )
}

/// Print the full record of an installation
pub fn display_claim_detailed(claim: &Claim) {
    let bold = Style::new().bold();
    let state = claim.state();

    println!("{}", Style::new().bold().yellow().apply_to(&claim.name));
    println!("  {} {}", bold.apply_to("State:"), state_style(state).apply_to(state));
    println!(
        "  {} {} {}",
        bold.apply_to("Bundle:"),
        claim.bundle.name,
        claim.bundle.version
    );
    println!("  {} {}", bold.apply_to("Reference:"), claim.bundle_reference);
    println!("  {} {}", bold.apply_to("Revision:"), claim.revision);
    println!(
        "  {} {}",
        bold.apply_to("Created:"),
        format_timestamp(&claim.created)
    );
    println!(
        "  {} {}",
        bold.apply_to("Modified:"),
        format_timestamp(&claim.modified)
    );
    println!(
        "  {} {} ({})",
        bold.apply_to("Last action:"),
        claim.result.action,
        status_style(claim.result.status).apply_to(claim.result.status)
    );
    if let Some(message) = &claim.result.message {
        println!("    {}", Style::new().red().apply_to(message));
    }

    if !claim.parameters.is_empty() {
        println!("  {}", bold.apply_to("Parameters:"));
        for (name, value) in &claim.parameters {
            println!("    {name}: {}", parameter_value_string(value));
        }
    }

    if !claim.credentials.is_empty() {
        println!(
            "  {} {}",
            bold.apply_to("Credentials:"),
            claim.credentials.join(", ")
        );
    }
}

/// One line per revision, as printed by `show --history`
pub fn revision_line(claim: &Claim) -> String {
    let mut line = format!(
        "{:>4}  {}  {:<10} {}",
        claim.revision,
        format_timestamp(&claim.modified),
        claim.result.action,
        status_style(claim.result.status).apply_to(claim.result.status),
    );
    if let Some(message) = &claim.result.message {
        line.push_str(&format!("  {message}"));
    }
    line
}
