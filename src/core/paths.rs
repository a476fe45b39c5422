//! Folder naming: the one grammar shared by parsing and path generation
//!
//! A project folder is named `YYYY.NNN<sep>Name`, where `<sep>` is
//! [`FOLDER_SEPARATOR`]. Reading is tolerant of the legacy `YYYY.NNN - Name`
//! form; writing always produces the canonical form.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{parse_digits, ProjectIdentifier, SEQUENCE_WIDTH, YEAR_WIDTH};

/// Separator between the identifier and the project name
pub const FOLDER_SEPARATOR: &str = " ";

/// Byte offset of the `.` between year and sequence
const DOT_OFFSET: usize = YEAR_WIDTH;

/// Byte range of the sequence field
const SEQUENCE_START: usize = DOT_OFFSET + 1;
const SEQUENCE_END: usize = SEQUENCE_START + SEQUENCE_WIDTH;

/// A parsed project folder name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderName {
    identifier: ProjectIdentifier,
    name: String,
}

impl FolderName {
    pub fn new(identifier: ProjectIdentifier, name: impl Into<String>) -> Self {
        Self {
            identifier,
            name: name.into(),
        }
    }

    pub fn identifier(&self) -> ProjectIdentifier {
        self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parse a full folder name into identifier and project name
    pub fn parse(entry: &str) -> Result<Self, FolderNameError> {
        let identifier = Self::parse_identifier(entry)?;

        let rest = entry
            .get(SEQUENCE_END..)
            .and_then(|r| r.strip_prefix(FOLDER_SEPARATOR))
            .ok_or_else(|| FolderNameError::MissingName(entry.to_string()))?;

        // Legacy folders use " - " between identifier and name
        let name = rest.trim_start_matches(['-', ' ']);
        if name.is_empty() {
            return Err(FolderNameError::MissingName(entry.to_string()));
        }

        Ok(Self {
            identifier,
            name: name.to_string(),
        })
    }

    /// Read the `YYYY.NNN` in the first eight characters, whatever follows
    ///
    /// This is the number an entry occupies: `2024.008_Bar` and
    /// `2024.0081 Foo` both hold 2024.008 for allocation purposes.
    pub fn parse_number_prefix(entry: &str) -> Result<ProjectIdentifier, FolderNameError> {
        let year_str = entry
            .get(..YEAR_WIDTH)
            .ok_or_else(|| FolderNameError::InvalidYear(entry.to_string()))?;
        let year = parse_digits(year_str, YEAR_WIDTH)
            .ok_or_else(|| FolderNameError::InvalidYear(entry.to_string()))?;

        if entry.get(DOT_OFFSET..SEQUENCE_START) != Some(".") {
            return Err(FolderNameError::MissingDot(entry.to_string()));
        }

        let seq_str = entry
            .get(SEQUENCE_START..SEQUENCE_END)
            .ok_or_else(|| FolderNameError::InvalidSequence(entry.to_string()))?;
        let sequence = parse_digits(seq_str, SEQUENCE_WIDTH)
            .ok_or_else(|| FolderNameError::InvalidSequence(entry.to_string()))?;

        ProjectIdentifier::new(year, sequence)
            .map_err(|_| FolderNameError::InvalidYear(entry.to_string()))
    }

    /// Parse only the `YYYY.NNN` prefix of a well-formed folder name
    ///
    /// The prefix must be followed by the separator or the end of the name,
    /// so `2024.0051 Foo` is rejected rather than read as sequence 5.
    pub fn parse_identifier(entry: &str) -> Result<ProjectIdentifier, FolderNameError> {
        let identifier = Self::parse_number_prefix(entry)?;

        match entry.get(SEQUENCE_END..) {
            Some("") => Ok(identifier),
            Some(rest) if rest.starts_with(FOLDER_SEPARATOR) => Ok(identifier),
            _ => Err(FolderNameError::InvalidSequence(entry.to_string())),
        }
    }
}

impl fmt::Display for FolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&folder_name(&self.identifier, &self.name))
    }
}

/// Build the canonical folder name for an identifier and project name
pub fn folder_name(identifier: &ProjectIdentifier, name: &str) -> String {
    format!("{}{}{}", identifier, FOLDER_SEPARATOR, name)
}

/// Build the canonical folder path under `root`
pub fn build_path(root: &Path, identifier: &ProjectIdentifier, name: &str) -> PathBuf {
    root.join(folder_name(identifier, name))
}

/// Reasons a directory entry is not a well-formed project folder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FolderNameError {
    #[error("'{0}' does not start with a four-digit year")]
    InvalidYear(String),

    #[error("'{0}' has no '.' after the year")]
    MissingDot(String),

    #[error("'{0}' does not have a three-digit sequence after the year")]
    InvalidSequence(String),

    #[error("'{0}' has no project name after the number")]
    MissingName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(year: u16, seq: u16) -> ProjectIdentifier {
        ProjectIdentifier::new(year, seq).unwrap()
    }

    #[test]
    fn test_build_path_uses_canonical_form() {
        let path = build_path(Path::new("/projects"), &id(2024, 3), "Gamma Tower");
        assert_eq!(path, PathBuf::from("/projects/2024.003 Gamma Tower"));
    }

    #[test]
    fn test_parse_canonical_folder() {
        let parsed = FolderName::parse("2024.007 Foo Residence").unwrap();
        assert_eq!(parsed.identifier(), id(2024, 7));
        assert_eq!(parsed.name(), "Foo Residence");
    }

    #[test]
    fn test_parse_legacy_dash_separator() {
        let parsed = FolderName::parse("2018.012 - Old Library").unwrap();
        assert_eq!(parsed.identifier(), id(2018, 12));
        assert_eq!(parsed.name(), "Old Library");
    }

    #[test]
    fn test_parse_rejects_non_project_entries() {
        assert!(matches!(
            FolderName::parse("Templates").unwrap_err(),
            FolderNameError::InvalidYear(_)
        ));
        assert!(matches!(
            FolderName::parse("2024-001 Foo").unwrap_err(),
            FolderNameError::MissingDot(_)
        ));
        assert!(matches!(
            FolderName::parse("2024.abc Foo").unwrap_err(),
            FolderNameError::InvalidSequence(_)
        ));
        assert!(matches!(
            FolderName::parse("2024.0051 Foo").unwrap_err(),
            FolderNameError::InvalidSequence(_)
        ));
        assert!(matches!(
            FolderName::parse("2024.005").unwrap_err(),
            FolderNameError::MissingName(_)
        ));
        assert!(matches!(
            FolderName::parse("2024.005 - ").unwrap_err(),
            FolderNameError::MissingName(_)
        ));
    }

    #[test]
    fn test_parse_identifier_accepts_bare_number() {
        assert_eq!(FolderName::parse_identifier("2024.005").unwrap(), id(2024, 5));
    }

    #[test]
    fn test_number_prefix_ignores_what_follows() {
        for entry in ["2024.008_Bar", "2024.008-Bar", "2024.0081 Wide", "2024.008"] {
            assert_eq!(FolderName::parse_number_prefix(entry).unwrap(), id(2024, 8));
        }
        assert!(FolderName::parse_identifier("2024.008_Bar").is_err());
        assert!(matches!(
            FolderName::parse_number_prefix("2024.0x8 Bar").unwrap_err(),
            FolderNameError::InvalidSequence(_)
        ));
        assert!(matches!(
            FolderName::parse_number_prefix("2024_008 Bar").unwrap_err(),
            FolderNameError::MissingDot(_)
        ));
    }

    #[test]
    fn test_parse_handles_multibyte_names() {
        assert!(FolderName::parse("ÄÖÜ").is_err());
        let parsed = FolderName::parse("2024.010 Café Müller").unwrap();
        assert_eq!(parsed.name(), "Café Müller");
    }

    #[test]
    fn test_parse_then_build_reproduces_folder_name() {
        let folders = [
            "2024.001 Acme HQ",
            "2024.002 Beta Labs",
            "2019.999 Riverside Clinic",
            "2021.000 Zero Day Studio",
        ];
        let root = Path::new("/srv/projects");

        for folder in folders {
            let parsed = FolderName::parse(folder).unwrap();
            let path = build_path(root, &parsed.identifier(), parsed.name());
            assert_eq!(path.file_name().unwrap().to_str().unwrap(), folder);
            assert_eq!(parsed.to_string(), folder);
        }
    }
}
