//! Declarative patch plans.
//!
//! A plan is a TOML document listing archive edits to apply in order:
//!
//! ```toml
//! backup_dir = "PatchBackups"
//!
//! [[step]]
//! op = "add"
//! from = "TABLE1.BNK:GHOST.SPR"
//! to = "TABLE2.BNK:GHOST.SPR"
//! force_replace = true
//!
//! [[step]]
//! op = "replace"
//! to = "TABLE2.BNK:TITLE.PAL"
//! entry = { data = "AQID", name = "VElUTEUuUEFMAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=", uncompressedSize = 3, isCompressed = 0 }
//!
//! [[step]]
//! op = "remove"
//! target = "TABLE2.BNK:UNUSED.SPR"
//! ignore_not_found = true
//! ```
//!
//! Inline `entry` tables are [`PortableEntry`] literals, as produced by
//! [`PortableEntry::to_literal`].

use crate::archive::PortableEntry;
use crate::backup::{DirectoryBackup, DEFAULT_BACKUP_DIR};
use crate::error::{BnkError, Result};
use crate::session::{EntryPath, EntrySource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// An ordered list of archive edits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchPlan {
    /// Backup directory, relative to the patch root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    #[serde(default, rename = "step")]
    pub steps: Vec<PatchStep>,
}

/// One archive edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchStep {
    /// Copy an entry into an archive, from another archive or an inline literal
    Add {
        to: EntryPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EntryPath>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entry: Option<PortableEntry>,
        #[serde(default)]
        force_replace: bool,
    },
    /// Overwrite an existing entry's content
    Replace {
        to: EntryPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EntryPath>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entry: Option<PortableEntry>,
    },
    /// Delete an entry
    Remove {
        target: EntryPath,
        #[serde(default)]
        ignore_not_found: bool,
    },
}

impl PatchPlan {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Read a plan file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Directory backup for this plan, rooted at `root`
    pub fn directory_backup(&self, root: &Path) -> DirectoryBackup {
        let backup_dir = self
            .backup_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));
        DirectoryBackup::new(root).with_backup_dir(backup_dir)
    }
}

/// Turn a step's `from` / `entry` pair into exactly one entry source
pub(crate) fn step_source(
    from: &Option<EntryPath>,
    entry: &Option<PortableEntry>,
    base: &Path,
) -> Result<EntrySource> {
    match (from, entry) {
        (Some(path), None) => Ok(EntrySource::Archive(path.resolve(base))),
        (None, Some(portable)) => Ok(EntrySource::Literal(portable.to_entry()?)),
        (Some(_), Some(_)) => Err(BnkError::InvalidArgument(
            "Step names both 'from' and 'entry'".to_string(),
        )),
        (None, None) => Err(BnkError::InvalidArgument(
            "Step needs either 'from' or 'entry'".to_string(),
        )),
    }
}
