use crate::archive::entry::BnkEntry;
use crate::archive::primitives::encode_name;
use crate::archive::reader::read_entries;
use crate::archive::writer::write_entries;
use crate::error::{BnkError, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Options for [`BnkArchive::add_entry`] and [`BnkArchive::add_entry_as`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Overwrite the content of an existing entry with the same name instead
    /// of failing with a duplicate-name error
    pub force_replace: bool,
}

impl AddOptions {
    pub fn replace() -> Self {
        Self {
            force_replace: true,
        }
    }
}

/// Options for [`BnkArchive::remove_entry`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Treat a missing entry as success
    pub ignore_not_found: bool,
}

impl RemoveOptions {
    pub fn ignore_not_found() -> Self {
        Self {
            ignore_not_found: true,
        }
    }
}

/// An in-memory BNK archive backed by one file path
///
/// The whole file is loaded on open. Mutations only touch the in-memory
/// entry list until [`save`](Self::save) rewrites the file. Entry names are
/// matched case-insensitively with padding trimmed, for lookups and removal
/// alike.
///
/// `save` is not crash-atomic: an interrupted write can leave a truncated
/// file behind.
#[derive(Debug, Clone)]
pub struct BnkArchive {
    path: PathBuf,
    entries: Vec<BnkEntry>,
}

impl BnkArchive {
    /// Load an archive from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let archive = Self::from_bytes(path, &bytes)?;

        info!(path = %path.display(), entries = archive.len(), "opened archive");
        Ok(archive)
    }

    /// Parse an archive image already in memory, associating it with `path`
    pub fn from_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            entries: read_entries(bytes)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in their current order (insertion order until the next save)
    pub fn entries(&self) -> &[BnkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get_entry(&self, name: &str) -> Option<&BnkEntry> {
        self.position(name).map(|index| &self.entries[index])
    }

    pub fn get_entry_mut(&mut self, name: &str) -> Option<&mut BnkEntry> {
        self.position(name).map(move |index| &mut self.entries[index])
    }

    /// Deep copy of the named entry, independent of the archive
    pub fn clone_entry(&self, name: &str) -> Option<BnkEntry> {
        self.get_entry(name).cloned()
    }

    /// Add `entry` under its own name
    pub fn add_entry(&mut self, entry: &BnkEntry, options: AddOptions) -> Result<()> {
        let name = entry.name().trim().to_string();
        self.add_entry_as(&name, entry, options)
    }

    /// Add `entry` under `name`
    ///
    /// If an entry called `name` already exists, `options.force_replace` must
    /// be set; its data, size and compression flag are then overwritten in
    /// place and its name field is kept. Otherwise a deep copy of `entry` is
    /// appended, renamed to `name` when the two differ.
    pub fn add_entry_as(&mut self, name: &str, entry: &BnkEntry, options: AddOptions) -> Result<()> {
        validate_target(name, entry)?;
        // Oversized names fail even when they would only overwrite
        encode_name(name)?;

        if let Some(index) = self.position(name) {
            if !options.force_replace {
                return Err(BnkError::DuplicateEntry(name.to_string()));
            }
            debug!(entry = name, archive = %self.path.display(), "overwriting entry");
            self.entries[index].assign_content(entry);
            return Ok(());
        }

        let mut clone = entry.clone();
        if entry.name() != name {
            clone.rename(name)?;
        }

        debug!(entry = name, archive = %self.path.display(), "adding entry");
        self.entries.push(clone);
        Ok(())
    }

    /// Overwrite the content of the entry sharing `entry`'s name
    pub fn replace_entry(&mut self, entry: &BnkEntry) -> Result<()> {
        let name = entry.name().trim().to_string();
        self.replace_entry_as(&name, entry)
    }

    /// Overwrite the data, size and compression flag of the entry called `name`
    pub fn replace_entry_as(&mut self, name: &str, entry: &BnkEntry) -> Result<()> {
        validate_target(name, entry)?;

        let index = self
            .position(name)
            .ok_or_else(|| BnkError::EntryNotFound(name.to_string()))?;

        debug!(entry = name, archive = %self.path.display(), "replacing entry");
        self.entries[index].assign_content(entry);
        Ok(())
    }

    /// Remove the first entry called `name`
    pub fn remove_entry(&mut self, name: &str, options: RemoveOptions) -> Result<()> {
        match self.position(name) {
            Some(index) => {
                debug!(entry = name, archive = %self.path.display(), "removing entry");
                self.entries.remove(index);
                Ok(())
            }
            None if options.ignore_not_found => Ok(()),
            None => Err(BnkError::EntryNotFound(name.to_string())),
        }
    }

    /// Sort entries into canonical order: ascending by raw name field
    pub fn normalize(&mut self) {
        self.entries.sort_by(|a, b| a.name_bytes().cmp(b.name_bytes()));
    }

    /// Normalize entry order and serialize into `writer`
    pub fn write_to<W: Write>(&mut self, writer: W) -> Result<usize> {
        self.normalize();
        write_entries(&self.entries, writer)
    }

    /// Normalize entry order and serialize to a byte vector
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Rewrite the archive at its own path
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.save_as(path)
    }

    /// Write the archive to `path`, leaving the archive's own path unchanged
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(BnkError::InvalidArgument("File name cannot be empty".to_string()));
        }

        // Serialize fully before the file is truncated
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes)?;

        info!(path = %path.display(), entries = self.len(), bytes = bytes.len(), "saved archive");
        Ok(())
    }

    /// Write every entry, decompressed, to `dir/<name>`
    ///
    /// The archive itself is not modified. Returns the paths written.
    pub fn extract_all<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let name = entry.name();
            let file_name = plain_file_name(name.trim())?;
            let target = dir.join(file_name);

            fs::write(&target, entry.decompressed_data()?)?;
            written.push(target);
        }

        info!(archive = %self.path.display(), dir = %dir.display(), files = written.len(), "extracted archive");
        Ok(written)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.matches(name))
    }
}

fn validate_target(name: &str, entry: &BnkEntry) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BnkError::Name("Entry name cannot be empty".to_string()));
    }
    if entry.data().is_empty() {
        return Err(BnkError::InvalidArgument(format!(
            "Entry '{}' cannot contain zero length data",
            name
        )));
    }
    Ok(())
}

/// Accept only names that stay inside the extraction directory
fn plain_file_name(name: &str) -> Result<&Path> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(path),
        _ => Err(BnkError::Name(format!(
            "'{}' is not a plain file name and cannot be extracted",
            name
        ))),
    }
}
