//! `pft next` command - Print the next free project number

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{load_settings, print_structured};
use crate::cli::GlobalOpts;
use crate::core::{current_year, peek_next, ProjectIdentifier};

#[derive(clap::Args, Debug)]
pub struct NextArgs {
    /// Year to look at (default: current year)
    #[arg(long)]
    pub year: Option<u16>,
}

#[derive(Serialize)]
struct NextNumber {
    identifier: ProjectIdentifier,
    previous: Option<String>,
    first_of_year: bool,
}

pub fn run(args: NextArgs, global: &GlobalOpts) -> Result<()> {
    let settings = load_settings(global);
    let year = args.year.unwrap_or_else(current_year);

    let allocation = peek_next(&settings, year)?;

    let out = NextNumber {
        identifier: allocation.identifier,
        previous: allocation.previous.clone(),
        first_of_year: allocation.is_first_of_year(),
    };
    if !print_structured(&out, global.format)? {
        println!("{}", out.identifier);
    }
    Ok(())
}
