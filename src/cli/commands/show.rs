//! `pft show` command - Look up a project by number

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{load_settings, print_structured, tsv_cell};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{lookup_project, ProjectIdentifier, ProjectRecord};

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project number (YYYY.NNN)
    pub number: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let settings = load_settings(global);
    let identifier = ProjectIdentifier::parse(args.number.trim()).into_diagnostic()?;

    let record = lookup_project(&settings, &identifier)?;

    if print_structured(&record, global.format)? {
        return Ok(());
    }
    if global.format == OutputFormat::Tsv {
        for (field, value) in record_fields(&record) {
            println!("{}\t{}", field, tsv_cell(&value));
        }
        return Ok(());
    }

    print_human(&record);
    Ok(())
}

fn record_fields(record: &ProjectRecord) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("folder", record.folder.clone()),
        ("path", record.path.display().to_string()),
    ];
    if let Some(info) = &record.info {
        fields.extend(info.fields());
    }
    fields
}

fn print_human(record: &ProjectRecord) {
    println!(
        "{} {}",
        style(record.identifier).yellow().bold(),
        style(&record.name).bold()
    );
    println!("   {} {}", style("Path:").dim(), style(record.path.display()).cyan());

    let Some(info) = &record.info else {
        println!("   {}", style("No project info document.").dim());
        return;
    };

    println!();
    for (field, value) in info.fields() {
        if value.is_empty() {
            println!("   {:<32} {}", style(field).dim(), style("-").dim());
        } else {
            println!("   {:<32} {}", style(field).dim(), value);
        }
    }
}
