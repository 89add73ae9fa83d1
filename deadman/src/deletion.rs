//! Best-effort recursive file removal.
//!
//! Every non-directory entry under a root is unlinked; directories are left in
//! place. Failures are collected per entry and the walk keeps going, so one
//! locked file cannot shield the rest of the tree.
//!
//! Symbolic links are never followed below the root: a link is removed as a
//! link and its target is untouched. A root that is itself a symlink to a
//! directory is walked through, since that is the tree the operator named.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::DeletionError;

/// Removes a single file. The seam between the walk and the filesystem.
pub trait FileRemover: Send + Sync {
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Removes files with [`std::fs::remove_file`].
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Outcome of deleting one root.
#[derive(Debug)]
pub struct DeletionReport {
    pub root: PathBuf,
    pub files_removed: usize,
    pub errors: Vec<DeletionError>,
}

impl DeletionReport {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            files_removed: 0,
            errors: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when the root could not be traversed at all.
    pub fn walk_aborted(&self) -> bool {
        self.errors
            .iter()
            .any(|err| matches!(err, DeletionError::Walk { .. }))
    }
}

/// Walks roots and removes the files found. Cheap to clone.
#[derive(Clone)]
pub struct DeletionExecutor {
    remover: Arc<dyn FileRemover>,
}

impl Default for DeletionExecutor {
    fn default() -> Self {
        Self::new(FsRemover)
    }
}

impl DeletionExecutor {
    pub fn new<R: FileRemover + 'static>(remover: R) -> Self {
        Self {
            remover: Arc::new(remover),
        }
    }

    /// Delete files under each root in order. One report per root.
    pub fn delete_all(&self, roots: &[PathBuf]) -> Vec<DeletionReport> {
        roots
            .iter()
            .map(|root| self.delete_files_under(root))
            .collect()
    }

    /// Remove every non-directory entry under `root`.
    ///
    /// Never fails: traversal and removal errors end up in the returned report.
    pub fn delete_files_under(&self, root: &Path) -> DeletionReport {
        info!(root = %root.display(), "deleting files");
        let mut report = DeletionReport::new(root);

        if let Err(source) = fs::metadata(root) {
            error!(root = %root.display(), error = %source, "cannot walk root");
            report.errors.push(DeletionError::Walk {
                root: root.to_path_buf(),
                source,
            });
            return report;
        }

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    error!(root = %root.display(), error = %err, "cannot walk root");
                    report.errors.push(DeletionError::Walk {
                        root: root.to_path_buf(),
                        source: err.into(),
                    });
                    break;
                }
                Err(err) => {
                    warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                    report.errors.push(DeletionError::Entry {
                        root: root.to_path_buf(),
                        source: err,
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            debug!(path = %path.display(), "removing file");
            match self.remover.remove_file(path) {
                Ok(()) => report.files_removed += 1,
                Err(source) => {
                    warn!(path = %path.display(), error = %source, "failed to remove file");
                    report.errors.push(DeletionError::Remove {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        if report.is_clean() {
            info!(
                root = %root.display(),
                files_removed = report.files_removed,
                "directory cleaned"
            );
        } else {
            warn!(
                root = %root.display(),
                files_removed = report.files_removed,
                errors = report.errors.len(),
                "directory cleaned with errors"
            );
        }
        report
    }
}
