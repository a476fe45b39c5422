//! Project operations: create, look up, update and list
//!
//! Every operation takes a fresh [`Snapshot`] of the projects root and
//! receives its [`Settings`] explicitly; nothing is cached between calls.

use chrono::Datelike;
use miette::Diagnostic;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::allocator::{next_sequence, AllocError, Allocation};
use crate::core::config::Settings;
use crate::core::identity::{IdParseError, ProjectIdentifier, ProjectType, YEAR_WIDTH};
use crate::core::metadata::{MetadataError, ProjectInfo, ProjectInfoPatch};
use crate::core::paths::{build_path, FolderName};
use crate::core::provision::{ProvisionError, ProvisionFs, ProvisionReport, Provisioner};
use crate::core::registry::{RegistryError, Snapshot};
use crate::core::validator::{validate, validate_manager, ProjectName, ValidationError};

/// Delimiter of the `number%name%type` request form
pub const REQUEST_DELIMITER: char = '%';

/// The current calendar year in local time
pub fn current_year() -> u16 {
    u16::try_from(chrono::Local::now().year()).unwrap_or(u16::MAX)
}

/// Which project number a request wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRequest {
    /// Allocate the next free number in the year
    Next { year: u16 },
    /// Use this exact number
    Explicit(ProjectIdentifier),
}

/// A request to create one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub number: NumberRequest,
    pub name: String,
    pub project_type: ProjectType,
    pub manager: Option<String>,
    pub dry_run: bool,
}

impl CreateRequest {
    /// A request for the next number in `year`
    pub fn next(year: u16, name: impl Into<String>, project_type: ProjectType) -> Self {
        Self {
            number: NumberRequest::Next { year },
            name: name.into(),
            project_type,
            manager: None,
            dry_run: false,
        }
    }

    /// Parse the `number%name%type` form
    ///
    /// An empty number allocates in `default_year`; a bare four-digit year
    /// allocates in that year; `YYYY.NNN` asks for that exact number. An
    /// empty type falls back to `default_type`.
    pub fn parse_request(
        request: &str,
        default_year: u16,
        default_type: ProjectType,
    ) -> Result<Self, RequestError> {
        let parts: Vec<&str> = request.split(REQUEST_DELIMITER).collect();
        let [number, name, kind] = parts.as_slice() else {
            return Err(RequestError::MalformedRequest(request.to_string()));
        };

        let number = number.trim();
        let number = if number.is_empty() {
            NumberRequest::Next { year: default_year }
        } else if number.len() == YEAR_WIDTH && !number.contains('.') {
            let year = number
                .parse::<u16>()
                .map_err(|_| IdParseError::InvalidYear(number.to_string()))?;
            ProjectIdentifier::new(year, 0)?;
            NumberRequest::Next { year }
        } else {
            NumberRequest::Explicit(ProjectIdentifier::parse(number)?)
        };

        let project_type = if kind.trim().is_empty() {
            default_type
        } else {
            kind.parse()?
        };

        Ok(Self {
            number,
            name: name.to_string(),
            project_type,
            manager: None,
            dry_run: false,
        })
    }

    pub fn with_manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = Some(manager.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Outcome of a successful create
#[derive(Debug, Clone, Serialize)]
pub struct Created {
    pub identifier: ProjectIdentifier,
    pub name: String,
    pub project_type: ProjectType,
    pub path: PathBuf,
    pub report: ProvisionReport,
    #[serde(skip)]
    pub allocation: Option<Allocation>,
    /// Written document; absent in a dry run
    pub info: Option<ProjectInfo>,
}

/// An existing project found by number
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRecord {
    pub identifier: ProjectIdentifier,
    pub folder: String,
    pub name: String,
    pub path: PathBuf,
    pub info: Option<ProjectInfo>,
}

/// Snapshot, allocate, validate, build the path, provision, seed metadata
pub fn create_project<F: ProvisionFs>(
    settings: &Settings,
    provisioner: &Provisioner<F>,
    request: CreateRequest,
) -> Result<Created, WorkflowError> {
    info!(
        name = %request.name,
        project_type = %request.project_type,
        dry_run = request.dry_run,
        "creating project"
    );
    debug!(?request, root = %settings.root.display(), "create arguments");

    let snapshot = Snapshot::take(&settings.root)?;

    let (identifier, allocation) = match request.number {
        NumberRequest::Next { year } => {
            let allocation = next_sequence(&snapshot, year)?;
            (allocation.identifier, Some(allocation))
        }
        NumberRequest::Explicit(id) => {
            debug!(%id, "using requested project number");
            (id, None)
        }
    };

    let manager = request
        .manager
        .as_deref()
        .map(validate_manager)
        .transpose()?;
    let name: ProjectName = validate(&request.name, &identifier, &snapshot)?;

    let path = build_path(&settings.root, &identifier, name.as_str());
    let template = settings.templates.for_type(request.project_type);
    debug!(path = %path.display(), template = %template.display(), "resolved paths");

    let report = provisioner.provision(&path, template, request.dry_run)?;

    let info = if request.dry_run {
        None
    } else {
        Some(ProjectInfo::seed(
            &path,
            identifier,
            name.as_str(),
            request.project_type,
            manager.as_deref(),
        )?)
    };

    info!(%identifier, path = %path.display(), dry_run = request.dry_run, "project ready");
    Ok(Created {
        identifier,
        name: name.into_inner(),
        project_type: request.project_type,
        path,
        report,
        allocation,
        info,
    })
}

/// Find the folder for a project number and read its information document
pub fn lookup_project(
    settings: &Settings,
    identifier: &ProjectIdentifier,
) -> Result<ProjectRecord, WorkflowError> {
    debug!(%identifier, "looking up project");
    let snapshot = Snapshot::take(&settings.root)?;

    let matches = snapshot.find_by_identifier(identifier);
    let folder = match matches.as_slice() {
        [] => return Err(WorkflowError::NotFound(*identifier)),
        [one] => one.to_string(),
        many => {
            return Err(WorkflowError::Ambiguous {
                identifier: *identifier,
                entries: many.iter().map(|s| s.to_string()).collect(),
            })
        }
    };

    let name = FolderName::parse(&folder)
        .map(|f| f.name().to_string())
        .unwrap_or_default();
    let path = settings.root.join(&folder);

    let info = match ProjectInfo::read(&path) {
        Ok(info) => Some(info),
        Err(MetadataError::Missing(_)) => None,
        Err(e) => return Err(e.into()),
    };

    info!(%identifier, folder = %folder, "found project");
    Ok(ProjectRecord {
        identifier: *identifier,
        folder,
        name,
        path,
        info,
    })
}

/// Rewrite fields of a project's information document
///
/// A project without a document gets one, seeded from its folder name.
pub fn update_project(
    settings: &Settings,
    identifier: &ProjectIdentifier,
    patch: &ProjectInfoPatch,
) -> Result<ProjectRecord, WorkflowError> {
    let mut record = lookup_project(settings, identifier)?;

    if let Some(manager) = &patch.manager {
        validate_manager(manager)?;
    }

    let mut info = record.info.take().unwrap_or_else(|| ProjectInfo {
        number: Some(*identifier),
        name: Some(record.name.clone()),
        ..Default::default()
    });
    info.apply(patch);
    info.write(&record.path)?;

    info!(%identifier, "updated project info");
    record.info = Some(info);
    Ok(record)
}

/// Well-formed project folders, optionally for one year
pub fn list_projects(
    settings: &Settings,
    year: Option<u16>,
) -> Result<Vec<FolderName>, WorkflowError> {
    let snapshot = Snapshot::take(&settings.root)?;
    Ok(snapshot.projects(year))
}

/// The number the next create in `year` would receive
pub fn peek_next(settings: &Settings, year: u16) -> Result<Allocation, WorkflowError> {
    let snapshot = Snapshot::take(&settings.root)?;
    Ok(next_sequence(&snapshot, year)?)
}

/// Problems with the shape of a request
#[derive(Debug, Error, Diagnostic)]
pub enum RequestError {
    #[error("expected NUMBER%NAME%TYPE, got '{0}'")]
    #[diagnostic(
        code(pft::request::malformed),
        help("leave NUMBER empty to allocate, e.g. '%Gamma Tower%Revit'")
    )]
    MalformedRequest(String),

    #[error(transparent)]
    #[diagnostic(code(pft::request::invalid_field))]
    InvalidField(#[from] IdParseError),
}

/// Errors from project operations
#[derive(Debug, Error, Diagnostic)]
pub enum WorkflowError {
    #[error(transparent)]
    #[diagnostic(code(pft::registry))]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(code(pft::allocate))]
    Allocation(#[from] AllocError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Request(#[from] RequestError),

    #[error("no project folder found for {0}")]
    #[diagnostic(code(pft::lookup::not_found), help("run 'pft list' to see existing projects"))]
    NotFound(ProjectIdentifier),

    #[error("project number {identifier} matches several folders: {}", .entries.join(", "))]
    #[diagnostic(
        code(pft::lookup::ambiguous),
        help("rename the duplicate folders so each number is used once")
    )]
    Ambiguous {
        identifier: ProjectIdentifier,
        entries: Vec<String>,
    },
}
