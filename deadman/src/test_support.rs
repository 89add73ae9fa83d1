//! Test-only helpers: scripted removers and seeded scratch trees.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::config::SwitchConfig;
use crate::deletion::{FileRemover, FsRemover};

/// Create each relative path under `root` (parents included) with dummy contents.
pub fn seed_files(root: &Path, files: &[&str]) {
    for rel in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, format!("{rel}\n")).expect("seed file");
    }
}

/// Remover that refuses files with the given names and removes everything else.
pub struct FailingRemover {
    refused: HashSet<String>,
}

impl FailingRemover {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            refused: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl FileRemover for FailingRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.refused.contains(name) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{name} is locked"),
            ));
        }
        FsRemover.remove_file(path)
    }
}

/// Remover that sleeps before each removal, so a deletion pass can be caught in flight.
pub struct SlowRemover {
    delay: Duration,
    started: Arc<AtomicBool>,
}

impl SlowRemover {
    /// Returns the remover and a flag that flips once the first removal begins.
    pub fn new(delay: Duration) -> (Self, Arc<AtomicBool>) {
        let started = Arc::new(AtomicBool::new(false));
        let remover = Self {
            delay,
            started: Arc::clone(&started),
        };
        (remover, started)
    }
}

impl FileRemover for SlowRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.started.store(true, Ordering::SeqCst);
        thread::sleep(self.delay);
        FsRemover.remove_file(path)
    }
}

/// Two scratch roots standing in for the repository and the working copy.
pub struct GuardedTrees {
    pub git_repo: tempfile::TempDir,
    pub local_code: tempfile::TempDir,
}

impl GuardedTrees {
    /// Seed both roots with a small nested layout.
    pub fn new() -> io::Result<Self> {
        let git_repo = tempfile::tempdir()?;
        let local_code = tempfile::tempdir()?;
        seed_files(git_repo.path(), &["HEAD", "refs/heads/main", "objects/ab/cdef"]);
        seed_files(local_code.path(), &["Cargo.toml", "src/main.rs", "src/util/mod.rs"]);
        Ok(Self {
            git_repo,
            local_code,
        })
    }

    pub fn config(&self, time_limit_seconds: u64) -> SwitchConfig {
        SwitchConfig::new(
            self.git_repo.path(),
            self.local_code.path(),
            time_limit_seconds,
        )
    }

    /// Number of non-directory entries left under both roots.
    pub fn remaining_files(&self) -> usize {
        count_files(self.git_repo.path()) + count_files(self.local_code.path())
    }
}

fn count_files(root: &Path) -> usize {
    walkdir::WalkDir::new(root)
        .into_iter()
        .flatten()
        .filter(|entry| !entry.file_type().is_dir())
        .count()
}
