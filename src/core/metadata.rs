//! Per-project information document (`project-info.yaml`)
//!
//! Lives at the top of every project folder. Templates may ship a copy with
//! firm-specific defaults; creation fills in only the identifying fields
//! and leaves the rest for the project manager.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::identity::{ProjectIdentifier, ProjectType};
use crate::yaml::YamlSyntaxError;

/// File name of the information document inside a project folder
pub const METADATA_FILE: &str = "project-info.yaml";

/// Descriptive data for one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    pub number: Option<ProjectIdentifier>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
    pub manager: Option<String>,
    pub site: Address,
    pub billing: BillingContact,
}

/// A postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: Option<String>,
    pub city_state_zip: Option<String>,
}

/// Who receives invoices for the project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingContact {
    pub name: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Address,
}

/// Field updates; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ProjectInfoPatch {
    pub manager: Option<String>,
    pub site_street: Option<String>,
    pub site_city_state_zip: Option<String>,
    pub billing_name: Option<String>,
    pub billing_title: Option<String>,
    pub billing_phone: Option<String>,
    pub billing_email: Option<String>,
    pub billing_street: Option<String>,
    pub billing_city_state_zip: Option<String>,
}

impl ProjectInfoPatch {
    pub fn is_empty(&self) -> bool {
        self.manager.is_none()
            && self.site_street.is_none()
            && self.site_city_state_zip.is_none()
            && self.billing_name.is_none()
            && self.billing_title.is_none()
            && self.billing_phone.is_none()
            && self.billing_email.is_none()
            && self.billing_street.is_none()
            && self.billing_city_state_zip.is_none()
    }
}

impl ProjectInfo {
    /// Location of the document inside `folder`
    pub fn path(folder: &Path) -> PathBuf {
        folder.join(METADATA_FILE)
    }

    /// Whether `folder` has a document
    pub fn exists(folder: &Path) -> bool {
        Self::path(folder).is_file()
    }

    /// Read the document from a project folder
    pub fn read(folder: &Path) -> Result<Self, MetadataError> {
        let path = Self::path(folder);
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MetadataError::Missing(path.clone())
            } else {
                MetadataError::Io {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        let to_diagnostic = |e: serde_yml::Error| {
            MetadataError::Syntax(YamlSyntaxError::from_serde_error(
                &e,
                &contents,
                &path.display().to_string(),
            ))
        };

        let value: serde_yml::Value = serde_yml::from_str(&contents).map_err(to_diagnostic)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yml::from_value(value).map_err(to_diagnostic)
    }

    /// Write the document into a project folder, replacing any existing copy
    pub fn write(&self, folder: &Path) -> Result<(), MetadataError> {
        let path = Self::path(folder);
        let yaml = serde_yml::to_string(self).map_err(MetadataError::Serialize)?;
        std::fs::write(&path, yaml).map_err(|e| MetadataError::Io {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "wrote project info");
        Ok(())
    }

    /// Fill in the identifying fields of a freshly provisioned folder
    ///
    /// A document copied from the template keeps its other fields.
    pub fn seed(
        folder: &Path,
        identifier: ProjectIdentifier,
        name: &str,
        project_type: ProjectType,
        manager: Option<&str>,
    ) -> Result<Self, MetadataError> {
        let mut doc = match Self::read(folder) {
            Ok(doc) => doc,
            Err(MetadataError::Missing(_)) => Self::default(),
            Err(e) => return Err(e),
        };

        doc.number = Some(identifier);
        doc.name = Some(name.to_string());
        doc.project_type = Some(project_type);
        if let Some(manager) = manager {
            doc.manager = Some(manager.to_string());
        }

        doc.write(folder)?;
        info!(%identifier, folder = %folder.display(), "seeded project info");
        Ok(doc)
    }

    /// Apply field updates
    pub fn apply(&mut self, patch: &ProjectInfoPatch) {
        fn set(field: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                let v = v.trim();
                *field = if v.is_empty() { None } else { Some(v.to_string()) };
            }
        }

        set(&mut self.manager, &patch.manager);
        set(&mut self.site.street, &patch.site_street);
        set(&mut self.site.city_state_zip, &patch.site_city_state_zip);
        set(&mut self.billing.name, &patch.billing_name);
        set(&mut self.billing.title, &patch.billing_title);
        set(&mut self.billing.phone, &patch.billing_phone);
        set(&mut self.billing.email, &patch.billing_email);
        set(&mut self.billing.address.street, &patch.billing_street);
        set(
            &mut self.billing.address.city_state_zip,
            &patch.billing_city_state_zip,
        );
    }

    /// Flattened `(field, value)` pairs in document order, for display
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        fn text(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }

        vec![
            ("number", self.number.map(|n| n.to_string()).unwrap_or_default()),
            ("name", text(&self.name)),
            (
                "type",
                self.project_type.map(|t| t.to_string()).unwrap_or_default(),
            ),
            ("manager", text(&self.manager)),
            ("site.street", text(&self.site.street)),
            ("site.city_state_zip", text(&self.site.city_state_zip)),
            ("billing.name", text(&self.billing.name)),
            ("billing.title", text(&self.billing.title)),
            ("billing.phone", text(&self.billing.phone)),
            ("billing.email", text(&self.billing.email)),
            ("billing.address.street", text(&self.billing.address.street)),
            (
                "billing.address.city_state_zip",
                text(&self.billing.address.city_state_zip),
            ),
        ]
    }
}

/// Errors reading or writing the information document
#[derive(Debug, Error, Diagnostic)]
pub enum MetadataError {
    #[error("project info not found: {0:?}")]
    #[diagnostic(code(pft::metadata::missing))]
    Missing(PathBuf),

    #[error("failed to access project info {path:?}: {source}")]
    #[diagnostic(code(pft::metadata::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("failed to serialize project info: {0}")]
    #[diagnostic(code(pft::metadata::serialize))]
    Serialize(#[source] serde_yml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn id(year: u16, seq: u16) -> ProjectIdentifier {
        ProjectIdentifier::new(year, seq).unwrap()
    }

    #[test]
    fn test_seed_without_template_copy() {
        let tmp = tempdir().unwrap();
        let doc = ProjectInfo::seed(
            tmp.path(),
            id(2024, 3),
            "Gamma Tower",
            ProjectType::Revit,
            Some("Ann Lee"),
        )
        .unwrap();

        let read = ProjectInfo::read(tmp.path()).unwrap();
        assert_eq!(read, doc);
        assert_eq!(read.number, Some(id(2024, 3)));
        assert_eq!(read.name.as_deref(), Some("Gamma Tower"));
        assert_eq!(read.project_type, Some(ProjectType::Revit));
        assert_eq!(read.manager.as_deref(), Some("Ann Lee"));
        assert!(read.billing.name.is_none());
    }

    #[test]
    fn test_seed_keeps_template_fields() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            ProjectInfo::path(tmp.path()),
            "name: PLACEHOLDER\nbilling:\n  title: Owner's Representative\n",
        )
        .unwrap();

        let doc =
            ProjectInfo::seed(tmp.path(), id(2024, 3), "Gamma Tower", ProjectType::Cad, None)
                .unwrap();

        assert_eq!(doc.name.as_deref(), Some("Gamma Tower"));
        assert_eq!(doc.billing.title.as_deref(), Some("Owner's Representative"));
        assert!(doc.manager.is_none());
    }

    #[test]
    fn test_read_missing() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            ProjectInfo::read(tmp.path()).unwrap_err(),
            MetadataError::Missing(_)
        ));
        assert!(!ProjectInfo::exists(tmp.path()));
    }

    #[test]
    fn test_read_empty_document() {
        let tmp = tempdir().unwrap();
        std::fs::write(ProjectInfo::path(tmp.path()), "\n").unwrap();
        assert_eq!(ProjectInfo::read(tmp.path()).unwrap(), ProjectInfo::default());
    }

    #[test]
    fn test_read_bad_type_is_syntax_error() {
        let tmp = tempdir().unwrap();
        std::fs::write(ProjectInfo::path(tmp.path()), "type: BIM\n").unwrap();
        assert!(matches!(
            ProjectInfo::read(tmp.path()).unwrap_err(),
            MetadataError::Syntax(_)
        ));
    }

    #[test]
    fn test_apply_patch() {
        let mut doc = ProjectInfo {
            manager: Some("Old PM".into()),
            ..Default::default()
        };
        let patch = ProjectInfoPatch {
            manager: Some("  New PM ".into()),
            billing_email: Some("ap@example.com".into()),
            site_street: Some("".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        doc.apply(&patch);

        assert_eq!(doc.manager.as_deref(), Some("New PM"));
        assert_eq!(doc.billing.email.as_deref(), Some("ap@example.com"));
        assert!(doc.site.street.is_none());
        assert!(ProjectInfoPatch::default().is_empty());
    }

    #[test]
    fn test_fields_order() {
        let doc = ProjectInfo {
            number: Some(id(2024, 1)),
            name: Some("Acme HQ".into()),
            ..Default::default()
        };
        let fields = doc.fields();
        assert_eq!(fields[0], ("number", "2024.001".to_string()));
        assert_eq!(fields[1], ("name", "Acme HQ".to_string()));
        assert_eq!(fields.len(), 12);
    }
}
