//! `pft list` command - List project folders under the root

use console::style;
use miette::Result;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_settings, print_structured, tsv_cell};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{list_projects, ProjectIdentifier};

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only projects from this year
    #[arg(long)]
    pub year: Option<u16>,
}

#[derive(Serialize)]
struct ListRow {
    number: ProjectIdentifier,
    name: String,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let settings = load_settings(global);
    let projects = list_projects(&settings, args.year)?;

    let rows: Vec<ListRow> = projects
        .iter()
        .map(|p| ListRow {
            number: p.identifier(),
            name: p.name().to_string(),
        })
        .collect();

    if print_structured(&rows, global.format)? {
        return Ok(());
    }

    if global.format == OutputFormat::Tsv {
        for row in &rows {
            println!("{}\t{}", row.number, tsv_cell(&row.name));
        }
        return Ok(());
    }

    if rows.is_empty() {
        println!("{}", style("No projects found.").dim());
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Number", "Name"]);
    for row in &rows {
        builder.push_record([row.number.to_string(), row.name.clone()]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    println!();
    println!("{} project(s)", style(rows.len()).cyan());
    Ok(())
}
