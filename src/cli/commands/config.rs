//! `pft config` command - Inspect the layered configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::helpers::print_structured;
use crate::cli::GlobalOpts;
use crate::core::config::{
    ENV_ROOT, ENV_TEMPLATE_CAD, ENV_TEMPLATE_GENERIC, ENV_TEMPLATE_REVIT,
};
use crate::core::{Config, ProjectType, Settings};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective settings after all layers are applied
    Show,

    /// Show paths to configuration files
    Path(PathArgs),
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only the local (.pft.yaml) config path
    #[arg(long = "local-only", conflicts_with = "global_only")]
    pub local_only: bool,

    /// Show only the global (user) config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(Serialize)]
struct EffectiveSettings {
    root: PathBuf,
    default_type: ProjectType,
    templates: BTreeMap<&'static str, PathBuf>,
}

impl From<&Settings> for EffectiveSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            root: settings.root.clone(),
            default_type: settings.default_type,
            templates: ProjectType::all()
                .iter()
                .map(|t| (t.as_str(), settings.templates.for_type(*t).to_path_buf()))
                .collect(),
        }
    }
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path(args) => run_path(args),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let settings = Config::load().resolve(global.root.as_deref());
    let effective = EffectiveSettings::from(&settings);

    if print_structured(&effective, global.format)? {
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    print_value_path("root", &effective.root);
    print_value("default_type", &effective.default_type.to_string());
    for (kind, path) in &effective.templates {
        let key = format!("templates.{}", kind.to_lowercase());
        let marker = if path.is_dir() {
            style("").dim()
        } else {
            style(" (missing)").red()
        };
        println!(
            "  {:<20} {}{}",
            style(key).cyan(),
            path.display(),
            marker
        );
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. --root flag");
    println!(
        "  2. Environment variables ({}, {}, {}, {})",
        ENV_ROOT, ENV_TEMPLATE_CAD, ENV_TEMPLATE_REVIT, ENV_TEMPLATE_GENERIC
    );
    println!("  3. Local config (.pft.yaml in the current directory)");
    println!("  4. Global config (~/.config/pft/config.yaml)");
    Ok(())
}

fn print_value(key: &str, value: &dyn std::fmt::Display) {
    println!("  {:<20} {}", style(key).cyan(), value);
}

fn print_value_path(key: &str, path: &Path) {
    print_value(key, &path.display());
}

fn run_path(args: PathArgs) -> Result<()> {
    let global_path = Config::global_config_path();
    let cwd = std::env::current_dir().into_diagnostic()?;
    let local_path = Config::local_config_path(&cwd);

    if args.local_only {
        println!("{}", local_path.display());
        return Ok(());
    }
    if args.global_only {
        let path = global_path
            .ok_or_else(|| miette::miette!("Could not determine the user config directory"))?;
        println!("{}", path.display());
        return Ok(());
    }

    println!("{}", style("Configuration file paths:").bold());
    println!();
    match &global_path {
        Some(path) => {
            println!("  {} {}", style("Global:").cyan(), path.display());
            print_exists(path, "         ");
        }
        None => println!(
            "  {} {}",
            style("Global:").cyan(),
            style("(no user config directory)").dim()
        ),
    }
    println!();
    println!("  {} {}", style("Local:").cyan(), local_path.display());
    print_exists(&local_path, "         ");
    Ok(())
}

fn print_exists(path: &Path, indent: &str) {
    if path.exists() {
        println!("{}{}", indent, style("(exists)").green());
    } else {
        println!("{}{}", indent, style("(not created)").dim());
    }
}
