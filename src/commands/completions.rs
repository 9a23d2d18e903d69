//! Shell completions command

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;

const BIN_NAME: &str = "stevedore";

pub fn run(args: CompletionsArgs) -> Result<()> {
    generate(args.shell, &mut std::io::stdout().lock());
    Ok(())
}

/// Write the completion script for `shell` covering every subcommand,
/// aliases included
fn generate(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn script(shell: Shell) -> String {
        let mut out = Vec::new();
        generate(shell, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bash_covers_canonical_and_alias_commands() {
        let bash = script(Shell::Bash);
        for word in ["bundle", "instances", "instance", "install", "uninstall", "cache"] {
            assert!(bash.contains(word), "missing {word}");
        }
    }

    #[test]
    fn test_zsh_script_is_for_stevedore() {
        assert!(script(Shell::Zsh).contains("#compdef stevedore"));
    }

    #[test]
    fn test_shell_is_case_insensitive_and_validated() {
        let cli = Cli::try_parse_from(["stevedore", "completions", "FISH"]).unwrap();
        assert!(matches!(
            cli.command,
            crate::cli::Commands::Completions(CompletionsArgs { shell: Shell::Fish })
        ));
        assert!(Cli::try_parse_from(["stevedore", "completions", "tcsh"]).is_err());
    }
}
