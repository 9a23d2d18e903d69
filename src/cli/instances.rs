use clap::Parser;

/// Arguments for the list command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Print claims as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the show command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Installation name
    pub name: String,

    /// Include every recorded revision
    #[arg(long)]
    pub history: bool,

    /// Print the claim as JSON
    #[arg(long)]
    pub json: bool,
}
