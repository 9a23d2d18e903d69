use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    stevedore completions bash > ~/.bash_completion.d/stevedore\n\n\
                  Generate zsh completions:\n    stevedore completions zsh > ~/.zfunc/_stevedore\n\n\
                  Generate fish completions:\n    stevedore completions fish > ~/.config/fish/completions/stevedore.fish")]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
