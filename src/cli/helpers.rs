//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Settings};

/// Load layered configuration and apply the `--root` flag
pub fn load_settings(global: &GlobalOpts) -> Settings {
    Config::load().resolve(global.root.as_deref())
}

/// Print a value as YAML or JSON; returns false for other formats
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Auto | OutputFormat::Tsv => Ok(false),
    }
}

/// Replace tabs and newlines so a value fits in one TSV cell
pub fn tsv_cell(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}
