use crate::archive::decompress::decompress;
use crate::archive::format::{DirectoryRecord, NAME_SIZE};
use crate::archive::portable::PortableEntry;
use crate::archive::primitives::{encode_name, read_bytes, read_string};
use crate::error::{BnkError, Result};
use std::borrow::Cow;
use std::fmt;

/// A named, possibly compressed blob stored in a BNK archive
///
/// When `is_compressed` is false, `data` holds exactly `uncompressed_size`
/// bytes. When true, `data` is the on-disk compressed form and decoding it
/// must produce exactly `uncompressed_size` bytes.
///
/// `Clone` is a deep copy; a clone never shares storage with its source.
#[derive(Clone, PartialEq, Eq)]
pub struct BnkEntry {
    name: [u8; NAME_SIZE],
    data: Vec<u8>,
    uncompressed_size: u32,
    is_compressed: bool,
}

impl BnkEntry {
    /// Create an entry from its parts
    pub fn new(name: &str, data: Vec<u8>, uncompressed_size: u32, is_compressed: bool) -> Result<Self> {
        Ok(Self {
            name: encode_name(name)?,
            data,
            uncompressed_size,
            is_compressed,
        })
    }

    /// Create an uncompressed entry
    pub fn raw(name: &str, data: Vec<u8>) -> Result<Self> {
        let size = u32::try_from(data.len()).map_err(|_| {
            BnkError::InvalidArgument(format!("Entry data of {} bytes is too large", data.len()))
        })?;
        Self::new(name, data, size, false)
    }

    /// Build an entry from an already encoded name field
    pub(crate) fn from_parts(
        name: [u8; NAME_SIZE],
        data: Vec<u8>,
        uncompressed_size: u32,
        is_compressed: bool,
    ) -> Self {
        Self {
            name,
            data,
            uncompressed_size,
            is_compressed,
        }
    }

    /// Capture the data region a directory record points at
    ///
    /// The region must lie entirely inside `archive`; nothing is clamped.
    pub(crate) fn from_record(archive: &[u8], record: &DirectoryRecord) -> Result<Self> {
        let file_len = archive.len();
        let offset_from_end = record.offset_from_end as usize;
        let stored_size = record.stored_size as usize;

        let data_start = file_len.checked_sub(offset_from_end).ok_or_else(|| {
            BnkError::OutOfBounds(format!(
                "Entry '{}' starts {} bytes before the beginning of a {}-byte file",
                String::from_utf8_lossy(trim_name(&record.name)),
                offset_from_end - file_len,
                file_len
            ))
        })?;

        if data_start + stored_size > file_len {
            return Err(BnkError::OutOfBounds(format!(
                "Entry '{}' data {}..{} exceeds file length {}",
                String::from_utf8_lossy(trim_name(&record.name)),
                data_start,
                data_start + stored_size,
                file_len
            )));
        }

        Ok(Self {
            name: record.name,
            data: read_bytes(archive, data_start, stored_size)?.to_vec(),
            uncompressed_size: record.uncompressed_size,
            is_compressed: record.is_compressed(),
        })
    }

    /// Decoded display name (NUL-trimmed, lossy for invalid UTF-8)
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(trim_name(&self.name))
    }

    /// The raw 32-byte on-disk name field
    pub fn name_bytes(&self) -> &[u8; NAME_SIZE] {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    pub fn is_compressed(&self) -> bool {
        self.is_compressed
    }

    /// Case-insensitive comparison of trimmed names
    ///
    /// Both sides are whitespace-trimmed, so `" PAD"` and `"pad"` name the same entry.
    ///
    /// Names that are not valid UTF-8 never match.
    pub fn matches(&self, name: &str) -> bool {
        match read_string(&self.name) {
            Ok(own) => own.to_lowercase() == name.trim().to_lowercase(),
            Err(_) => false,
        }
    }

    /// Replace the name field, zero-padding to 32 bytes
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        self.name = encode_name(new_name)?;
        Ok(())
    }

    /// Take the data, size and compression state of `other`, keeping this name
    pub(crate) fn assign_content(&mut self, other: &BnkEntry) {
        self.data = other.data.clone();
        self.uncompressed_size = other.uncompressed_size;
        self.is_compressed = other.is_compressed;
    }

    /// Decode the data without changing the entry
    pub fn decompressed_data(&self) -> Result<Cow<'_, [u8]>> {
        if !self.is_compressed {
            return Ok(Cow::Borrowed(&self.data));
        }
        Ok(Cow::Owned(decompress(
            &self.data,
            self.uncompressed_size as usize,
        )?))
    }

    /// Move the entry from its compressed to its decompressed state
    ///
    /// A no-op for entries that are already decompressed. On an integrity
    /// error the entry is left exactly as it was.
    pub fn decompress(&mut self) -> Result<()> {
        if !self.is_compressed {
            return Ok(());
        }

        self.data = decompress(&self.data, self.uncompressed_size as usize)?;
        self.is_compressed = false;
        Ok(())
    }

    /// Text-safe projection of this entry
    pub fn wrap(&self) -> PortableEntry {
        PortableEntry::from(self)
    }
}

impl fmt::Debug for BnkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BnkEntry")
            .field("name", &self.name())
            .field("data_len", &self.data.len())
            .field("uncompressed_size", &self.uncompressed_size)
            .field("is_compressed", &self.is_compressed)
            .finish()
    }
}

fn trim_name(name: &[u8]) -> &[u8] {
    let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
    &name[..end]
}
