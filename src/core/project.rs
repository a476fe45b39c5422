//! Projects root setup: the template folders and local config

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::config::{DEFAULT_TEMPLATE_DIR, LOCAL_CONFIG_FILE};
use crate::core::identity::ProjectType;
use crate::core::metadata::{ProjectInfo, METADATA_FILE};

/// A projects root prepared for use
#[derive(Debug)]
pub struct ProjectsRoot {
    root: PathBuf,
}

impl ProjectsRoot {
    /// Lay out a projects root at `path`
    ///
    /// Creates `_Templates/<type>` for every project type, each with a blank
    /// project info document, and a commented `.pft.yaml`.
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(LOCAL_CONFIG_FILE).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::init_force(&root)
    }

    /// Initialize even if the root was set up before; existing templates
    /// and documents are kept
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        std::fs::create_dir_all(&root).map_err(|e| ProjectError::IoError(e.to_string()))?;

        for kind in ProjectType::all() {
            let dir = Self::template_dir(&root, *kind);
            std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

            if !ProjectInfo::exists(&dir) {
                let blank = ProjectInfo {
                    project_type: Some(*kind),
                    ..Default::default()
                };
                blank
                    .write(&dir)
                    .map_err(|e| ProjectError::IoError(e.to_string()))?;
            }
        }

        std::fs::write(root.join(LOCAL_CONFIG_FILE), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        info!(root = %root.display(), "initialized projects root");
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Project folder toolkit configuration

# Directory holding the project folders (default: current directory)
# root: "P:/Projects"

# Template trees copied into new projects (default: <root>/_Templates/<type>)
# templates:
#   cad: "_Templates/CAD"
#   revit: "_Templates/Revit"
#   generic: "_Templates/Generic"

# Type used when a request leaves the type empty (CAD, Revit, Generic)
# default_type: Generic
"#
    }

    /// Default template folder for a project type
    pub fn template_dir(root: &Path, kind: ProjectType) -> PathBuf {
        root.join(DEFAULT_TEMPLATE_DIR).join(kind.as_str())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths created by `init`, relative to the root, for display
    pub fn layout() -> Vec<String> {
        let mut out = vec![LOCAL_CONFIG_FILE.to_string()];
        for kind in ProjectType::all() {
            out.push(format!("{}/{}/", DEFAULT_TEMPLATE_DIR, kind.as_str()));
            out.push(format!(
                "{}/{}/{}",
                DEFAULT_TEMPLATE_DIR,
                kind.as_str(),
                METADATA_FILE
            ));
        }
        out
    }
}

/// Errors that can occur while setting up a projects root
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("projects root already initialized at {0:?}. Use --force to reinitialize.")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
