//! Provisioning: copying a discipline template into a new project folder
//!
//! Immediately before the destination is created the parent directory is
//! listed again, and any entry already carrying the destination's
//! `YYYY.NNN` prefix stops the run with [`ProvisionError::NumberTaken`].
//! The destination itself is created with a non-recursive `create_dir`, so
//! a folder made by another operator since the snapshot is reported as
//! [`ProvisionError::FolderAlreadyExists`] and never written into. This is
//! best effort; no lock is taken on the projects root.
//!
//! A copy that fails partway leaves the partial folder in place.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::identity::ProjectType;
use crate::core::paths::FolderName;

/// Template roots for each project type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSet {
    pub cad: PathBuf,
    pub revit: PathBuf,
    pub generic: PathBuf,
}

impl TemplateSet {
    /// Conventional layout: one folder per type under `base`
    pub fn under(base: &Path) -> Self {
        Self {
            cad: base.join(ProjectType::Cad.as_str()),
            revit: base.join(ProjectType::Revit.as_str()),
            generic: base.join(ProjectType::Generic.as_str()),
        }
    }

    /// Template root for a project type
    pub fn for_type(&self, project_type: ProjectType) -> &Path {
        match project_type {
            ProjectType::Cad => &self.cad,
            ProjectType::Revit => &self.revit,
            ProjectType::Generic => &self.generic,
        }
    }
}

/// Filesystem operations the provisioner mutates through
pub trait ProvisionFs {
    fn exists(&self, path: &Path) -> bool;

    /// Create a single directory; must fail if it already exists
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Names of the entries directly under `dir`
    fn entry_names(&self, dir: &Path) -> io::Result<Vec<String>> {
        std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect()
    }
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl ProvisionFs for StdFs {
    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as taken
        path.symlink_metadata().is_ok()
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }
}

/// What a provisioning run did, or would have done
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub destination: PathBuf,
    pub template: PathBuf,
    /// Subdirectories created below the destination
    pub directories: usize,
    pub files: usize,
    pub dry_run: bool,
}

/// One entry of a template tree, relative to the template root
#[derive(Debug)]
struct PlannedEntry {
    relative: PathBuf,
    is_dir: bool,
}

/// Copies template trees into new project folders
#[derive(Debug, Default)]
pub struct Provisioner<F: ProvisionFs = StdFs> {
    fs: F,
}

impl Provisioner<StdFs> {
    pub fn new() -> Self {
        Self { fs: StdFs }
    }
}

impl<F: ProvisionFs> Provisioner<F> {
    /// Provisioner over a custom filesystem implementation
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Create `path` as a copy of `template_root`
    ///
    /// With `dry_run` every check still runs, including the existence
    /// check on `path`, but nothing is created.
    pub fn provision(
        &self,
        path: &Path,
        template_root: &Path,
        dry_run: bool,
    ) -> Result<ProvisionReport, ProvisionError> {
        if !template_root.is_dir() {
            return Err(ProvisionError::TemplateNotFound(template_root.to_path_buf()));
        }

        let plan = plan_copy(template_root)?;
        let directories = plan.iter().filter(|e| e.is_dir).count();
        let files = plan.len() - directories;

        info!(
            destination = %path.display(),
            template = %template_root.display(),
            dry_run,
            "provisioning project folder"
        );

        // Re-check right before mutating: the snapshot may be stale
        if self.fs.exists(path) {
            return Err(ProvisionError::FolderAlreadyExists(path.to_path_buf()));
        }
        self.check_number_free(path)?;

        let report = ProvisionReport {
            destination: path.to_path_buf(),
            template: template_root.to_path_buf(),
            directories,
            files,
            dry_run,
        };

        if dry_run {
            for entry in &plan {
                let kind = if entry.is_dir { "directory" } else { "file" };
                debug!(kind, path = %path.join(&entry.relative).display(), "would create");
            }
            info!(
                destination = %path.display(),
                directories,
                files,
                "dry run: no changes made"
            );
            return Ok(report);
        }

        self.fs.create_dir(path).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                ProvisionError::FolderAlreadyExists(path.to_path_buf())
            } else {
                ProvisionError::ProvisionFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        for entry in &plan {
            let target = path.join(&entry.relative);
            let result = if entry.is_dir {
                self.fs.create_dir(&target)
            } else {
                self.fs.copy_file(&template_root.join(&entry.relative), &target)
            };
            result.map_err(|e| ProvisionError::ProvisionFailed {
                path: target.clone(),
                source: e,
            })?;
            debug!(path = %target.display(), "created");
        }

        info!(
            destination = %path.display(),
            directories,
            files,
            "project folder created"
        );
        Ok(report)
    }
}

impl<F: ProvisionFs> Provisioner<F> {
    /// Refuse when a sibling of `path` already uses its project number
    ///
    /// Destinations whose name has no `YYYY.NNN` prefix are not checked.
    fn check_number_free(&self, path: &Path) -> Result<(), ProvisionError> {
        let Some(number) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| FolderName::parse_number_prefix(n).ok())
        else {
            return Ok(());
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let prefix = number.to_string();
        let names = self
            .fs
            .entry_names(parent)
            .map_err(|e| ProvisionError::ProvisionFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;

        if let Some(existing) = names.into_iter().find(|n| n.starts_with(&prefix)) {
            debug!(%number, existing = %existing, "project number claimed since snapshot");
            return Err(ProvisionError::NumberTaken {
                number: prefix,
                existing: parent.join(existing),
            });
        }
        Ok(())
    }
}

/// Enumerate a template tree, parents before children, in name order
///
/// Symbolic links are followed, so a linked folder is copied as a folder.
fn plan_copy(template_root: &Path) -> Result<Vec<PlannedEntry>, ProvisionError> {
    let mut plan = Vec::new();
    for entry in WalkDir::new(template_root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ProvisionError::TemplateUnreadable {
            path: template_root.to_path_buf(),
            source: e,
        })?;
        let relative = entry
            .path()
            .strip_prefix(template_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
        plan.push(PlannedEntry {
            relative,
            is_dir: entry.file_type().is_dir(),
        });
    }
    Ok(plan)
}

/// Errors that can occur while provisioning a folder
#[derive(Debug, Error, Diagnostic)]
pub enum ProvisionError {
    #[error("template folder not found: {0:?}")]
    #[diagnostic(
        code(pft::provision::template_not_found),
        help("check the templates section of your configuration")
    )]
    TemplateNotFound(PathBuf),

    #[error("failed to read template folder {path:?}: {source}")]
    #[diagnostic(code(pft::provision::template_unreadable))]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("project folder already exists: {0:?}")]
    #[diagnostic(
        code(pft::provision::already_exists),
        help("another project may have been created meanwhile; run the command again to allocate a new number")
    )]
    FolderAlreadyExists(PathBuf),

    #[error("project number {number} was taken by {existing:?} while this project was being created")]
    #[diagnostic(
        code(pft::provision::number_taken),
        help("run the command again to allocate a new number")
    )]
    NumberTaken { number: String, existing: PathBuf },

    #[error("failed to provision {path:?}: {source}")]
    #[diagnostic(
        code(pft::provision::failed),
        help("the partially created project folder was left in place for inspection")
    )]
    ProvisionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use tempfile::{tempdir, TempDir};
    use tracing_subscriber::fmt::MakeWriter;

    /// Records every mutation and optionally fails after a number of copies
    #[derive(Default)]
    struct SpyFs {
        calls: RefCell<Vec<String>>,
        fail_after_copies: Option<usize>,
        copies: RefCell<usize>,
    }

    impl SpyFs {
        fn failing_after(copies: usize) -> Self {
            Self {
                fail_after_copies: Some(copies),
                ..Default::default()
            }
        }

        fn mutations(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ProvisionFs for SpyFs {
        fn exists(&self, path: &Path) -> bool {
            StdFs.exists(path)
        }

        fn create_dir(&self, path: &Path) -> io::Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("mkdir {}", path.display()));
            StdFs.create_dir(path)
        }

        fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
            if let Some(limit) = self.fail_after_copies {
                if *self.copies.borrow() >= limit {
                    return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
                }
            }
            *self.copies.borrow_mut() += 1;
            self.calls.borrow_mut().push(format!("copy {}", to.display()));
            StdFs.copy_file(from, to)
        }
    }

    /// Build a small Revit-like template tree
    fn template() -> TempDir {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("01 Admin")).unwrap();
        std::fs::create_dir_all(root.join("02 Drawings/Sheets")).unwrap();
        std::fs::write(root.join("01 Admin/checklist.txt"), "checklist").unwrap();
        std::fs::write(root.join("02 Drawings/model.rvt"), "model").unwrap();
        std::fs::write(root.join("02 Drawings/Sheets/A101.txt"), "sheet").unwrap();
        tmp
    }

    fn tree(root: &Path) -> Vec<String> {
        let mut out: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| {
                e.unwrap()
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_copies_full_tree() {
        let tpl = template();
        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");

        let report = Provisioner::new().provision(&dest, tpl.path(), false).unwrap();

        assert_eq!(tree(&dest), tree(tpl.path()));
        assert_eq!(
            std::fs::read_to_string(dest.join("02 Drawings/Sheets/A101.txt")).unwrap(),
            "sheet"
        );
        assert_eq!(report.directories, 3);
        assert_eq!(report.files, 3);
        assert!(!report.dry_run);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let tpl = template();
        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");
        let provisioner = Provisioner::with_fs(SpyFs::default());

        let report = provisioner.provision(&dest, tpl.path(), true).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.files, 3);
        assert!(provisioner.fs().mutations().is_empty());
        assert!(!dest.exists());
        assert!(tree(projects.path()).is_empty());
    }

    #[test]
    fn test_existing_folder_is_not_touched() {
        let tpl = template();
        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("theirs.txt"), "keep me").unwrap();

        let provisioner = Provisioner::with_fs(SpyFs::default());
        for dry_run in [false, true] {
            let err = provisioner.provision(&dest, tpl.path(), dry_run).unwrap_err();
            assert!(matches!(err, ProvisionError::FolderAlreadyExists(ref p) if *p == dest));
        }

        assert!(provisioner.fs().mutations().is_empty());
        assert_eq!(tree(&dest), vec!["theirs.txt"]);
        assert_eq!(
            std::fs::read_to_string(dest.join("theirs.txt")).unwrap(),
            "keep me"
        );
    }

    /// Claims the destination is free, as if it was created just after the check
    struct RacingFs;

    impl ProvisionFs for RacingFs {
        fn exists(&self, _path: &Path) -> bool {
            false
        }

        fn entry_names(&self, _dir: &Path) -> io::Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn create_dir(&self, path: &Path) -> io::Result<()> {
            StdFs.create_dir(path)
        }

        fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
            StdFs.copy_file(from, to)
        }
    }

    #[test]
    fn test_create_dir_race_reports_already_exists() {
        let tpl = template();
        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");
        std::fs::create_dir(&dest).unwrap();

        let err = Provisioner::with_fs(RacingFs)
            .provision(&dest, tpl.path(), false)
            .unwrap_err();

        assert!(matches!(err, ProvisionError::FolderAlreadyExists(_)));
        assert!(tree(&dest).is_empty());
    }

    #[test]
    fn test_sibling_with_same_number_blocks_both_modes() {
        let tpl = template();
        let projects = tempdir().unwrap();
        std::fs::create_dir(projects.path().join("2024.003 Delta Plaza")).unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");

        let provisioner = Provisioner::with_fs(SpyFs::default());
        for dry_run in [false, true] {
            match provisioner.provision(&dest, tpl.path(), dry_run).unwrap_err() {
                ProvisionError::NumberTaken { number, existing } => {
                    assert_eq!(number, "2024.003");
                    assert_eq!(existing, projects.path().join("2024.003 Delta Plaza"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        assert!(provisioner.fs().mutations().is_empty());
        assert!(!dest.exists());
    }

    #[test]
    fn test_unnumbered_destination_skips_sibling_check() {
        let tpl = template();
        let projects = tempdir().unwrap();
        std::fs::create_dir(projects.path().join("Scratch Old")).unwrap();
        let dest = projects.path().join("Scratch");

        Provisioner::new().provision(&dest, tpl.path(), false).unwrap();
        assert!(dest.join("01 Admin/checklist.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_template_folder_is_copied_as_folder() {
        let tpl = template();
        let shared = tempdir().unwrap();
        std::fs::write(shared.path().join("titleblock.txt"), "tb").unwrap();
        std::os::unix::fs::symlink(shared.path(), tpl.path().join("03 Shared")).unwrap();

        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");
        let report = Provisioner::new().provision(&dest, tpl.path(), false).unwrap();

        assert!(dest.join("03 Shared").is_dir());
        assert_eq!(
            std::fs::read_to_string(dest.join("03 Shared/titleblock.txt")).unwrap(),
            "tb"
        );
        assert_eq!((report.directories, report.files), (4, 4));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_template_link_fails_before_writing() {
        let tpl = template();
        std::os::unix::fs::symlink(tpl.path().join("missing"), tpl.path().join("04 Gone")).unwrap();

        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");
        let err = Provisioner::new().provision(&dest, tpl.path(), false).unwrap_err();

        assert!(matches!(err, ProvisionError::TemplateUnreadable { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_partial_copy_left_in_place() {
        let tpl = template();
        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");
        let provisioner = Provisioner::with_fs(SpyFs::failing_after(1));

        let err = provisioner.provision(&dest, tpl.path(), false).unwrap_err();

        match err {
            ProvisionError::ProvisionFailed { path, source } => {
                assert!(path.starts_with(&dest));
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(dest.is_dir());
        assert!(dest.join("01 Admin/checklist.txt").is_file());
        assert!(!dest.join("02 Drawings/model.rvt").exists());
    }

    #[test]
    fn test_missing_template() {
        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");
        let missing = projects.path().join("_Templates/Revit");

        for dry_run in [false, true] {
            let err = Provisioner::new().provision(&dest, &missing, dry_run).unwrap_err();
            assert!(matches!(err, ProvisionError::TemplateNotFound(ref p) if *p == missing));
        }
        assert!(!dest.exists());
    }

    #[test]
    fn test_empty_template_creates_bare_folder() {
        let tpl = tempdir().unwrap();
        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.000 Empty Start");

        let report = Provisioner::new().provision(&dest, tpl.path(), false).unwrap();
        assert!(dest.is_dir());
        assert_eq!((report.directories, report.files), (0, 0));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (value, logs)
    }

    #[test]
    fn test_dry_run_is_idempotent() {
        let tpl = template();
        let projects = tempdir().unwrap();
        let dest = projects.path().join("2024.003 Gamma Tower");
        let provisioner = Provisioner::with_fs(SpyFs::default());

        let (first, first_logs) = captured(|| provisioner.provision(&dest, tpl.path(), true));
        let (second, second_logs) = captured(|| provisioner.provision(&dest, tpl.path(), true));

        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(first_logs, second_logs);
        assert!(first_logs.contains("dry run: no changes made"));
        assert!(first_logs.contains("would create"));
        assert!(provisioner.fs().mutations().is_empty());
        assert!(tree(projects.path()).is_empty());
    }

    #[test]
    fn test_template_set_mapping() {
        let set = TemplateSet::under(Path::new("/t"));
        assert_eq!(set.for_type(ProjectType::Cad), Path::new("/t/CAD"));
        assert_eq!(set.for_type(ProjectType::Revit), Path::new("/t/Revit"));
        assert_eq!(set.for_type(ProjectType::Generic), Path::new("/t/Generic"));
    }
}
