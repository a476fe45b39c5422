//! `pft create` command - Allocate a number and provision a project folder

use console::style;
use miette::Result;

use crate::cli::helpers::{load_settings, print_structured, tsv_cell};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{create_project, current_year, CreateRequest, Created, Provisioner};

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Project as NUMBER%NAME%TYPE; NUMBER may be empty, a year, or YYYY.NNN
    #[arg(value_name = "NUMBER%NAME%TYPE")]
    pub request: String,

    /// Run every check and report what would happen, without writing
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Project manager recorded in the project info
    #[arg(long, short = 'm')]
    pub manager: Option<String>,

    /// Year to allocate in when NUMBER is empty (default: current year)
    #[arg(long)]
    pub year: Option<u16>,
}

pub fn run(args: CreateArgs, global: &GlobalOpts) -> Result<()> {
    let settings = load_settings(global);
    let year = args.year.unwrap_or_else(current_year);

    let mut request = CreateRequest::parse_request(&args.request, year, settings.default_type)?
        .dry_run(args.dry_run);
    if let Some(manager) = args.manager {
        request = request.with_manager(manager);
    }

    let created = create_project(&settings, &Provisioner::new(), request)?;

    if print_structured(&created, global.format)? {
        return Ok(());
    }
    match global.format {
        OutputFormat::Tsv => println!(
            "{}\t{}\t{}\t{}",
            created.identifier,
            tsv_cell(&created.name),
            created.project_type,
            created.path.display()
        ),
        _ => print_human(&created),
    }
    Ok(())
}

fn print_human(created: &Created) {
    let folder = format!("{} {}", created.identifier, created.name);

    if created.report.dry_run {
        println!(
            "{} Dry run: would create {}",
            style("○").cyan(),
            style(&folder).yellow()
        );
    } else {
        println!(
            "{} Created project {}",
            style("✓").green(),
            style(&folder).yellow()
        );
    }

    println!(
        "   {} {}",
        style("Path:").dim(),
        style(created.path.display()).cyan()
    );
    println!(
        "   {} {} ({} folders, {} files)",
        style("Template:").dim(),
        created.project_type,
        created.report.directories,
        created.report.files
    );

    if let Some(allocation) = &created.allocation {
        if allocation.is_first_of_year() {
            println!(
                "   {} first project of {}",
                style("Note:").dim(),
                created.identifier.year()
            );
        }
        let skipped = allocation.malformed().count();
        if skipped > 0 {
            println!(
                "   {} {} folder(s) with malformed names were ignored",
                style("!").yellow(),
                skipped
            );
        }
    }
}
