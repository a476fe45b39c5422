//! `pft update` command - Edit a project's info document

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{load_settings, print_structured};
use crate::cli::GlobalOpts;
use crate::core::{update_project, ProjectIdentifier, ProjectInfoPatch};

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Project number (YYYY.NNN)
    pub number: String,

    /// Project manager
    #[arg(long)]
    pub manager: Option<String>,

    /// Project site street address
    #[arg(long)]
    pub street: Option<String>,

    /// Project site city, state and zip
    #[arg(long)]
    pub city_state_zip: Option<String>,

    /// Billing contact name
    #[arg(long)]
    pub billing_name: Option<String>,

    /// Billing contact title
    #[arg(long)]
    pub billing_title: Option<String>,

    /// Billing contact phone
    #[arg(long)]
    pub billing_phone: Option<String>,

    /// Billing contact email
    #[arg(long)]
    pub billing_email: Option<String>,

    /// Billing street address
    #[arg(long)]
    pub billing_street: Option<String>,

    /// Billing city, state and zip
    #[arg(long)]
    pub billing_city_state_zip: Option<String>,
}

impl UpdateArgs {
    fn patch(&self) -> ProjectInfoPatch {
        ProjectInfoPatch {
            manager: self.manager.clone(),
            site_street: self.street.clone(),
            site_city_state_zip: self.city_state_zip.clone(),
            billing_name: self.billing_name.clone(),
            billing_title: self.billing_title.clone(),
            billing_phone: self.billing_phone.clone(),
            billing_email: self.billing_email.clone(),
            billing_street: self.billing_street.clone(),
            billing_city_state_zip: self.billing_city_state_zip.clone(),
        }
    }
}

pub fn run(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let patch = args.patch();
    if patch.is_empty() {
        return Err(miette::miette!(
            help = "pass at least one field, e.g. --manager \"Ann Lee\"",
            "Nothing to update"
        ));
    }

    let settings = load_settings(global);
    let identifier = ProjectIdentifier::parse(args.number.trim()).into_diagnostic()?;
    let record = update_project(&settings, &identifier, &patch)?;

    if print_structured(&record, global.format)? {
        return Ok(());
    }
    println!(
        "{} Updated project info for {} {}",
        style("✓").green(),
        style(record.identifier).yellow(),
        record.name
    );
    Ok(())
}
