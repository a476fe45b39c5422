//! Identifier allocation: the next free sequence number for a year

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::identity::{IdParseError, ProjectIdentifier, MAX_SEQUENCE, YEAR_WIDTH};
use crate::core::paths::{FolderName, FolderNameError};
use crate::core::registry::Snapshot;

/// Result of allocating an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// The identifier to use for the new project
    pub identifier: ProjectIdentifier,
    /// Folder holding the previous highest sequence, if any
    pub previous: Option<String>,
    /// Conditions noticed during the scan; none of them stop allocation
    pub notices: Vec<AllocationNotice>,
}

impl Allocation {
    /// True when no project existed for the year yet
    pub fn is_first_of_year(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, AllocationNotice::NoPriorProject { .. }))
    }

    /// Entries skipped because their name was malformed
    pub fn malformed(&self) -> impl Iterator<Item = &str> {
        self.notices.iter().filter_map(|n| match n {
            AllocationNotice::MalformedFolderName { entry, .. } => Some(entry.as_str()),
            AllocationNotice::NoPriorProject { .. } => None,
        })
    }
}

/// Non-fatal conditions reported by the allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationNotice {
    /// No folder exists for the year; allocation starts at 0
    NoPriorProject { year: u16 },
    /// An entry claims the year but does not follow the naming convention
    MalformedFolderName {
        entry: String,
        reason: FolderNameError,
    },
}

/// Compute the next unused identifier for `year`
///
/// Entries whose first four characters are the year are candidates. A
/// candidate occupies the sequence in its `YYYY.NNN` prefix whatever follows
/// it, matching the prefix rule the validator uses for collisions. The
/// highest sequence wins; equal sequences are broken by the
/// lexicographically last folder name. Candidates without a readable
/// prefix are skipped and reported as notices.
pub fn next_sequence(snapshot: &Snapshot, year: u16) -> Result<Allocation, AllocError> {
    // Validates the year up front so a bad year never scans
    ProjectIdentifier::new(year, 0)?;

    let year_text = format!("{:0width$}", year, width = YEAR_WIDTH);
    let mut notices = Vec::new();
    let mut best: Option<(u16, &str)> = None;

    for entry in snapshot.entries() {
        if entry.get(..YEAR_WIDTH) != Some(year_text.as_str()) {
            continue;
        }

        match FolderName::parse_number_prefix(entry) {
            Ok(id) => {
                let candidate = (id.sequence(), entry.as_str());
                if best.map_or(true, |b| candidate > b) {
                    best = Some(candidate);
                }
            }
            Err(reason) => {
                warn!(entry = %entry, %reason, "skipping malformed project folder");
                notices.push(AllocationNotice::MalformedFolderName {
                    entry: entry.clone(),
                    reason,
                });
            }
        }
    }

    let (sequence, previous) = match best {
        Some((seq, _)) if seq >= MAX_SEQUENCE => {
            return Err(AllocError::SequenceExhausted { year });
        }
        Some((seq, entry)) => {
            debug!(previous = %entry, sequence = seq, "found latest project for year");
            (seq + 1, Some(entry.to_string()))
        }
        None => {
            info!(year, "no prior project for year, starting at 0");
            notices.push(AllocationNotice::NoPriorProject { year });
            (0, None)
        }
    };

    let identifier = ProjectIdentifier::new(year, sequence)?;
    info!(%identifier, "allocated project number");

    Ok(Allocation {
        identifier,
        previous,
        notices,
    })
}

/// Errors that stop allocation
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("all project numbers for {year} are in use ({year}.999 reached)")]
    SequenceExhausted { year: u16 },

    #[error(transparent)]
    InvalidYear(#[from] IdParseError),
}
