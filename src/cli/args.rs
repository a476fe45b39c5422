//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, create::CreateArgs, init::InitArgs,
    list::ListArgs, next::NextArgs, show::ShowArgs, update::UpdateArgs,
};

#[derive(Parser)]
#[command(name = "pft")]
#[command(author, version, about = "Project Folder Toolkit")]
#[command(long_about = "Allocates sequential project numbers and creates project folders from CAD, Revit or generic templates.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Log each step and its result
    #[arg(long, global = true, conflicts_with = "debug")]
    pub info: bool,

    /// Log raw arguments and intermediate values
    #[arg(long, global = true)]
    pub debug: bool,

    /// Projects root (default: config, then PFT_ROOT, then current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

impl GlobalOpts {
    /// Log level requested on the command line, if any
    pub fn log_level(&self) -> Option<&'static str> {
        if self.debug {
            Some("debug")
        } else if self.info {
            Some("info")
        } else {
            None
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare a projects root with template folders and a config file
    Init(InitArgs),

    /// Create a project folder from NUMBER%NAME%TYPE
    Create(CreateArgs),

    /// Print the next free project number
    Next(NextArgs),

    /// List existing project folders
    List(ListArgs),

    /// Show a project and its project info
    Show(ShowArgs),

    /// Update fields of a project's info document
    Update(UpdateArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
}
