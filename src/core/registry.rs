//! Folder registry snapshot: one read of the projects root per operation

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::identity::ProjectIdentifier;
use crate::core::paths::FolderName;

/// The entries directly under a projects root, read once
///
/// A snapshot is never refreshed. Operations that need a newer view take a
/// new snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: PathBuf,
    entries: Vec<String>,
}

impl Snapshot {
    /// List the root directory
    pub fn take(root: &Path) -> Result<Self, RegistryError> {
        if !root.is_dir() {
            return Err(RegistryError::RootNotFound(root.to_path_buf()));
        }

        let read_dir = std::fs::read_dir(root).map_err(|e| RegistryError::Io {
            path: root.to_path_buf(),
            source: e,
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| RegistryError::Io {
                path: root.to_path_buf(),
                source: e,
            })?;
            entries.push(entry.file_name().to_string_lossy().into_owned());
        }

        let snapshot = Self::from_entries(root, entries);
        debug!(
            root = %root.display(),
            entries = snapshot.entries.len(),
            "took folder snapshot"
        );
        Ok(snapshot)
    }

    /// Build a snapshot from a known list of entry names
    pub fn from_entries<I, S>(root: &Path, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        entries.sort();
        Self {
            root: root.to_path_buf(),
            entries,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All entry names, sorted ascending
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry starts with `prefix`
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.entries.iter().any(|e| e.starts_with(prefix))
    }

    /// Entries whose `YYYY.NNN` prefix parses to exactly `identifier`
    pub fn find_by_identifier(&self, identifier: &ProjectIdentifier) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| FolderName::parse_identifier(e).ok().as_ref() == Some(identifier))
            .map(String::as_str)
            .collect()
    }

    /// Well-formed project folders, optionally restricted to one year
    pub fn projects(&self, year: Option<u16>) -> Vec<FolderName> {
        self.entries
            .iter()
            .filter_map(|e| FolderName::parse(e).ok())
            .filter(|f| year.map_or(true, |y| f.identifier().year() == y))
            .collect()
    }
}

/// Errors that can occur while reading the projects root
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("projects root not found or not a directory: {0:?}")]
    RootNotFound(PathBuf),

    #[error("failed to read projects root {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
