//! Name and number validation
//!
//! A project name becomes a literal path segment, so the rules here are
//! about keeping folder names portable and unambiguous.

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::core::identity::ProjectIdentifier;
use crate::core::registry::Snapshot;

/// Minimum length of a project name after trimming
pub const MIN_NAME_LEN: usize = 6;

/// Minimum length of a project manager name after trimming
pub const MIN_MANAGER_LEN: usize = 3;

/// Characters trimmed from both ends of a name (in addition to whitespace)
const TRIM_CHARS: &[char] = &['_', '.', '-'];

/// Characters that may not appear anywhere in a name
pub const FORBIDDEN_CHARS: &[char] = &[
    ',', ';', ':', '"', '\'', '\\', '`', '~', '!', '%', '^', '#', '&', '{', '}', '|', '<', '>',
    '?', '*', '/',
];

/// A project name that passed normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trim whitespace and `_ . -` from both ends until nothing more comes off
fn trim_name(name: &str) -> &str {
    name.trim_matches(|c: char| c.is_whitespace() || TRIM_CHARS.contains(&c))
}

/// Trim and check a proposed name without looking at the filesystem
pub fn normalize_name(name: &str) -> Result<ProjectName, ValidationError> {
    let trimmed = trim_name(name);

    let mut found: Vec<char> = Vec::new();
    for c in trimmed.chars().filter(|c| FORBIDDEN_CHARS.contains(c)) {
        if !found.contains(&c) {
            found.push(c);
        }
    }
    if !found.is_empty() {
        return Err(ValidationError::ForbiddenCharacter {
            name: trimmed.to_string(),
            found: found.into_iter().collect(),
        });
    }

    let actual = trimmed.chars().count();
    if actual < MIN_NAME_LEN {
        return Err(ValidationError::TooShort {
            name: trimmed.to_string(),
            min: MIN_NAME_LEN,
            actual,
        });
    }

    Ok(ProjectName(trimmed.to_string()))
}

/// Check a name and the identifier it will be filed under
///
/// The identifier check is against the snapshot. It is repeated at folder
/// creation time by the provisioner.
pub fn validate(
    name: &str,
    identifier: &ProjectIdentifier,
    snapshot: &Snapshot,
) -> Result<ProjectName, ValidationError> {
    debug!(raw_name = %name, %identifier, "validating project");
    let normalized = normalize_name(name)?;

    let prefix = identifier.to_string();
    if let Some(existing) = snapshot.entries().iter().find(|e| e.starts_with(&prefix)) {
        return Err(ValidationError::IdentifierTaken {
            identifier: *identifier,
            existing: existing.clone(),
        });
    }

    debug!(name = %normalized, "project name accepted");
    Ok(normalized)
}

/// Check a project manager name
pub fn validate_manager(manager: &str) -> Result<String, ValidationError> {
    let trimmed = manager.trim();
    if trimmed.chars().count() < MIN_MANAGER_LEN {
        return Err(ValidationError::ManagerTooShort {
            manager: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Reasons a project request is rejected before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("project name '{name}' is too short ({actual} characters, need at least {min})")]
    #[diagnostic(
        code(pft::validate::too_short),
        help("provide a descriptive project name")
    )]
    TooShort {
        name: String,
        min: usize,
        actual: usize,
    },

    #[error("project name '{name}' contains forbidden characters: {found}")]
    #[diagnostic(
        code(pft::validate::forbidden_character),
        help("names become folder names; avoid , ; : \" ' \\ ` ~ ! % ^ # & {{ }} | < > ? * /")
    )]
    ForbiddenCharacter { name: String, found: String },

    #[error("project number {identifier} is already used by '{existing}'")]
    #[diagnostic(
        code(pft::validate::identifier_taken),
        help("leave the number empty to allocate the next free one")
    )]
    IdentifierTaken {
        identifier: ProjectIdentifier,
        existing: String,
    },

    #[error("project manager '{manager}' is too short")]
    #[diagnostic(
        code(pft::validate::manager_too_short),
        help("enter a valid project manager name")
    )]
    ManagerTooShort { manager: String },
}
