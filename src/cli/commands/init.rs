//! `pft init` command - Prepare a projects root

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::project::{ProjectError, ProjectsRoot};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite .pft.yaml even if the root was set up before
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let root = if args.force {
        ProjectsRoot::init_force(&path)
    } else {
        ProjectsRoot::init(&path)
    };

    match root {
        Ok(root) => {
            println!(
                "{} Initialized projects root at {}",
                style("✓").green(),
                style(root.root().display()).cyan()
            );
            println!();
            println!("Created layout:");
            print_layout(root.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Fill the template folders with your standard structure",
                style("_Templates/<type>/").yellow()
            );
            println!(
                "  {} Create your first project",
                style("pft create \"%Project Name%Revit\"").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Projects root already initialized at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("pft init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_layout(root: &Path) {
    for entry in ProjectsRoot::layout() {
        if root.join(&entry).exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}
