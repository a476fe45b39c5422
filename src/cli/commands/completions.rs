//! Shell completion generation
//!
//! # Usage
//!
//! ```bash
//! # Bash - add to ~/.bashrc
//! source <(pft completions bash)
//!
//! # Zsh - add to ~/.zshrc
//! source <(pft completions zsh)
//!
//! # Fish
//! pft completions fish > ~/.config/fish/completions/pft.fish
//!
//! # PowerShell - add to $PROFILE
//! pft completions powershell >> $PROFILE
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "pft", &mut io::stdout());
    Ok(())
}
