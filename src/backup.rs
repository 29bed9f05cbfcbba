//! Snapshot-before-mutate gate.
//!
//! A [`PatchSession`](crate::session::PatchSession) asks its gate for a
//! backup before it rewrites any archive. The gate answers with a plain
//! "safe to proceed".

use crate::error::{BnkError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default backup directory name, relative to the patch root
pub const DEFAULT_BACKUP_DIR: &str = "PatchBackups";

/// Precondition gate consulted before a file is modified in place
pub trait BackupGate {
    /// Make sure a backup of `path` exists
    ///
    /// Returns `false` when no backup could be made and the file must not be
    /// touched.
    fn ensure_backup(&mut self, path: &Path) -> Result<bool>;
}

/// Keeps one copy per file name in a backup directory
///
/// The first snapshot of a file wins; later calls for the same file name
/// leave the existing backup alone, so it always holds the pre-patch state.
#[derive(Debug, Clone)]
pub struct DirectoryBackup {
    root: PathBuf,
    backup_dir: PathBuf,
}

impl DirectoryBackup {
    /// Back up into `root/PatchBackups`, restoring into `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let backup_dir = root.join(DEFAULT_BACKUP_DIR);
        Self { root, backup_dir }
    }

    /// Use an explicit backup directory
    pub fn with_backup_dir<P: AsRef<Path>>(mut self, backup_dir: P) -> Self {
        self.backup_dir = self.root.join(backup_dir);
        self
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Move every backup back into the root directory, overwriting
    ///
    /// Returns the restored paths. A missing backup directory restores nothing.
    pub fn restore_all(&self) -> Result<Vec<PathBuf>> {
        if !self.backup_dir.is_dir() {
            debug!(dir = %self.backup_dir.display(), "no backup directory");
            return Ok(Vec::new());
        }

        let mut restored = Vec::new();
        for dir_entry in fs::read_dir(&self.backup_dir)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let target = self.root.join(dir_entry.file_name());
            move_file(&dir_entry.path(), &target)?;
            restored.push(target);
        }

        restored.sort();
        info!(count = restored.len(), "restored backups");
        Ok(restored)
    }
}

impl BackupGate for DirectoryBackup {
    fn ensure_backup(&mut self, path: &Path) -> Result<bool> {
        if !path.is_file() {
            warn!(path = %path.display(), "cannot back up missing file");
            return Ok(false);
        }

        let file_name = path.file_name().ok_or_else(|| {
            BnkError::InvalidArgument(format!("'{}' has no file name", path.display()))
        })?;

        fs::create_dir_all(&self.backup_dir)?;
        let backup_path = self.backup_dir.join(file_name);
        if backup_path.exists() {
            return Ok(true);
        }

        fs::copy(path, &backup_path)?;
        debug!(path = %path.display(), backup = %backup_path.display(), "backed up file");
        Ok(true)
    }
}

/// Rename, falling back to copy + delete across filesystems
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}
