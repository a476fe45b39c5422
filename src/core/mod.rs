//! Core module - project numbering and folder provisioning

pub mod allocator;
pub mod config;
pub mod identity;
pub mod metadata;
pub mod paths;
pub mod project;
pub mod provision;
pub mod registry;
pub mod validator;
pub mod workflow;

pub use allocator::{next_sequence, AllocError, Allocation, AllocationNotice};
pub use config::{Config, Settings};
pub use identity::{IdParseError, ProjectIdentifier, ProjectType};
pub use metadata::{MetadataError, ProjectInfo, ProjectInfoPatch, METADATA_FILE};
pub use paths::{build_path, folder_name, FolderName, FolderNameError, FOLDER_SEPARATOR};
pub use project::{ProjectError, ProjectsRoot};
pub use provision::{ProvisionError, ProvisionFs, ProvisionReport, Provisioner, StdFs, TemplateSet};
pub use registry::{RegistryError, Snapshot};
pub use validator::{normalize_name, validate, validate_manager, ProjectName, ValidationError};
pub use workflow::{
    create_project, current_year, list_projects, lookup_project, peek_next, update_project,
    CreateRequest, Created, NumberRequest, ProjectRecord, RequestError, WorkflowError,
};
