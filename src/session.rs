//! Patch session: a sequence of archive edits sharing one cache.
//!
//! The session owns every archive it loads for the duration of a run, keyed
//! by path, so a series of edits against the same file reloads it only once.
//! Nothing is cached globally; two sessions never see each other's state.

use crate::archive::{AddOptions, BnkArchive, BnkEntry, RemoveOptions};
use crate::backup::BackupGate;
use crate::error::{BnkError, Result};
use crate::plan::{step_source, PatchPlan, PatchStep};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// An entry inside a specific archive file, written `ARCHIVE:ENTRY`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryPath {
    pub archive: PathBuf,
    pub entry: String,
}

impl EntryPath {
    pub fn new<P: AsRef<Path>>(archive: P, entry: &str) -> Self {
        Self {
            archive: archive.as_ref().to_path_buf(),
            entry: entry.to_string(),
        }
    }

    /// Resolve a relative archive path against `base`
    pub fn resolve(&self, base: &Path) -> Self {
        Self {
            archive: base.join(&self.archive),
            entry: self.entry.clone(),
        }
    }
}

impl FromStr for EntryPath {
    type Err = BnkError;

    /// Split at the last colon so drive-letter paths keep working
    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once(':') {
            Some((archive, entry)) if !archive.is_empty() && !entry.is_empty() => {
                Ok(Self::new(archive, entry))
            }
            _ => Err(BnkError::InvalidArgument(format!(
                "'{}' is not of the form ARCHIVE:ENTRY",
                s
            ))),
        }
    }
}

impl TryFrom<String> for EntryPath {
    type Error = BnkError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<EntryPath> for String {
    fn from(path: EntryPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.archive.display(), self.entry)
    }
}

/// Where the entry for an add or replace comes from
#[derive(Debug, Clone)]
pub enum EntrySource {
    /// An entry in another (or the same) archive file
    Archive(EntryPath),
    /// An entry carried by the caller, such as an unwrapped portable entry
    Literal(BnkEntry),
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive(path) => write!(f, "{}", path),
            Self::Literal(entry) => write!(f, "<literal>:{}", entry.name()),
        }
    }
}

/// Applies archive edits behind a backup gate, caching loaded archives
pub struct PatchSession<B: BackupGate> {
    backup: B,
    archives: HashMap<PathBuf, BnkArchive>,
}

impl<B: BackupGate> PatchSession<B> {
    pub fn new(backup: B) -> Self {
        Self {
            backup,
            archives: HashMap::new(),
        }
    }

    pub fn backup(&self) -> &B {
        &self.backup
    }

    /// Give back the backup gate, dropping the cache
    pub fn into_backup(self) -> B {
        self.backup
    }

    /// A previously loaded archive, if this session has touched `path`
    pub fn archive<P: AsRef<Path>>(&self, path: P) -> Option<&BnkArchive> {
        self.archives.get(path.as_ref())
    }

    /// Copy an entry into `to`, then save the destination archive
    pub fn add(&mut self, source: &EntrySource, to: &EntryPath, options: AddOptions) -> Result<()> {
        info!(from = %source, to = %to, force_replace = options.force_replace, "copying entry");
        self.require_backup(&to.archive)?;

        let entry = self.resolve_source(source)?;
        self.edit(&to.archive, |archive| archive.add_entry_as(&to.entry, &entry, options))
    }

    /// Overwrite an existing entry in `to`, then save the destination archive
    pub fn replace(&mut self, source: &EntrySource, to: &EntryPath) -> Result<()> {
        info!(from = %source, to = %to, "replacing entry");
        self.require_backup(&to.archive)?;

        let entry = self.resolve_source(source)?;
        self.edit(&to.archive, |archive| archive.replace_entry_as(&to.entry, &entry))
    }

    /// Delete an entry, then save the archive
    pub fn remove(&mut self, target: &EntryPath, options: RemoveOptions) -> Result<()> {
        info!(target = %target, "deleting entry");
        self.require_backup(&target.archive)?;

        self.edit(&target.archive, |archive| archive.remove_entry(&target.entry, options))
    }

    /// Run every step of `plan` in order, resolving relative paths against `base`
    ///
    /// Stops at the first failing step; earlier steps stay applied.
    pub fn apply(&mut self, plan: &PatchPlan, base: &Path) -> Result<()> {
        for (index, step) in plan.steps.iter().enumerate() {
            info!(step = index + 1, total = plan.steps.len(), "applying patch step");
            match step {
                PatchStep::Add {
                    to,
                    from,
                    entry,
                    force_replace,
                } => {
                    let source = step_source(from, entry, base)?;
                    let options = AddOptions {
                        force_replace: *force_replace,
                    };
                    self.add(&source, &to.resolve(base), options)?;
                }
                PatchStep::Replace { to, from, entry } => {
                    let source = step_source(from, entry, base)?;
                    self.replace(&source, &to.resolve(base))?;
                }
                PatchStep::Remove {
                    target,
                    ignore_not_found,
                } => {
                    let options = RemoveOptions {
                        ignore_not_found: *ignore_not_found,
                    };
                    self.remove(&target.resolve(base), options)?;
                }
            }
        }
        Ok(())
    }

    fn require_backup(&mut self, path: &Path) -> Result<()> {
        if self.backup.ensure_backup(path)? {
            Ok(())
        } else {
            Err(BnkError::BackupUnavailable(path.display().to_string()))
        }
    }

    fn resolve_source(&mut self, source: &EntrySource) -> Result<BnkEntry> {
        match source {
            EntrySource::Literal(entry) => Ok(entry.clone()),
            EntrySource::Archive(path) => self
                .load(&path.archive)?
                .clone_entry(&path.entry)
                .ok_or_else(|| BnkError::EntryNotFound(path.to_string())),
        }
    }

    /// Apply `change` to a staged copy and save it
    ///
    /// The cache only takes the new state once it is on disk, so a failed
    /// save leaves the cached archive matching the file.
    fn edit<F>(&mut self, path: &Path, change: F) -> Result<()>
    where
        F: FnOnce(&mut BnkArchive) -> Result<()>,
    {
        let mut staged = self.load(path)?.clone();
        change(&mut staged)?;
        staged.save()?;
        self.archives.insert(path.to_path_buf(), staged);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<&BnkArchive> {
        match self.archives.entry(path.to_path_buf()) {
            Entry::Occupied(cached) => Ok(cached.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(BnkArchive::open(path)?)),
        }
    }
}
