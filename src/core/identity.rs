//! Project identity: `YYYY.NNN` identifiers and discipline types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width of the zero-padded sequence field
pub const SEQUENCE_WIDTH: usize = 3;

/// Largest sequence number a year can hold
pub const MAX_SEQUENCE: u16 = 999;

/// Width of the year field
pub const YEAR_WIDTH: usize = 4;

/// Discipline of a project, selecting the template tree to copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    /// AutoCAD drawing set
    #[serde(rename = "CAD", alias = "cad")]
    Cad,
    /// Revit model
    #[serde(rename = "Revit", alias = "revit")]
    Revit,
    /// Folder structure only
    #[default]
    #[serde(rename = "Generic", alias = "generic", alias = "Other")]
    Generic,
}

impl ProjectType {
    /// Get the string representation of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Cad => "CAD",
            ProjectType::Revit => "Revit",
            ProjectType::Generic => "Generic",
        }
    }

    /// Get all project types
    pub fn all() -> &'static [ProjectType] {
        &[ProjectType::Cad, ProjectType::Revit, ProjectType::Generic]
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cad" => Ok(ProjectType::Cad),
            "revit" => Ok(ProjectType::Revit),
            "generic" | "other" => Ok(ProjectType::Generic),
            _ => Err(IdParseError::InvalidType(s.to_string())),
        }
    }
}

/// A project identifier: the year plus a sequence number within that year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectIdentifier {
    year: u16,
    sequence: u16,
}

impl ProjectIdentifier {
    /// Create an identifier, checking the year is four digits and the
    /// sequence fits in three
    pub fn new(year: u16, sequence: u16) -> Result<Self, IdParseError> {
        if !(1000..=9999).contains(&year) {
            return Err(IdParseError::InvalidYear(year.to_string()));
        }
        if sequence > MAX_SEQUENCE {
            return Err(IdParseError::SequenceOutOfRange(sequence));
        }
        Ok(Self { year, sequence })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Parse an identifier from its canonical `YYYY.NNN` form
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for ProjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}.{:0width$}",
            self.year,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for ProjectIdentifier {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year_str, seq_str) = s
            .split_once('.')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let year = parse_digits(year_str, YEAR_WIDTH)
            .ok_or_else(|| IdParseError::InvalidYear(year_str.to_string()))?;
        let sequence = parse_digits(seq_str, SEQUENCE_WIDTH)
            .ok_or_else(|| IdParseError::InvalidSequence(seq_str.to_string()))?;

        Self::new(year, sequence)
    }
}

impl Serialize for ProjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ProjectIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a fixed-width run of ASCII digits
pub(crate) fn parse_digits(s: &str, width: usize) -> Option<u16> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Errors that can occur when parsing identifiers or project types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("missing '.' delimiter in project number: '{0}' (expected YYYY.NNN)")]
    MissingDelimiter(String),

    #[error("invalid year '{0}' (expected four digits)")]
    InvalidYear(String),

    #[error("invalid sequence '{0}' (expected three digits)")]
    InvalidSequence(String),

    #[error("sequence {0} is out of range (0-999)")]
    SequenceOutOfRange(u16),

    #[error("invalid project type: '{0}' (valid: CAD, Revit, Generic)")]
    InvalidType(String),
}
