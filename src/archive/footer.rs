use crate::archive::format::DIRECTORY_RECORD_SIZE;
use crate::archive::primitives::{read_bytes, read_u32};
use crate::error::{BnkError, Result};
use std::io::Write;

/// Footer magic: "Wildfire", four NULs, then format version 1 as a uint16
pub const FOOTER_MAGIC: [u8; 14] = *b"Wildfire\0\0\0\0\x01\0";

/// Footer size in bytes (fixed)
pub const FOOTER_SIZE: usize = 18;

/// Trailing footer
///
/// Located at the very end of the archive (last 18 bytes). The directory
/// records sit immediately before it, so a reader locates everything by
/// working back from the end of the file.
///
/// Structure (18 bytes fixed):
/// - Magic: "Wildfire\0\0\0\0\x01\0" (14 bytes)
/// - Entry Count: uint32 (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub entry_count: u32,
}

impl Footer {
    pub fn new(entry_count: u32) -> Self {
        Self { entry_count }
    }

    /// Read the footer from the last 18 bytes of the archive
    ///
    /// The magic is verified before the entry count is looked at.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FOOTER_SIZE {
            return Err(BnkError::Format(format!(
                "File is {} bytes, smaller than the {}-byte footer",
                data.len(),
                FOOTER_SIZE
            )));
        }

        let start = data.len() - FOOTER_SIZE;
        if read_bytes(data, start, FOOTER_MAGIC.len())? != FOOTER_MAGIC {
            return Err(BnkError::InvalidMagic);
        }

        Ok(Self {
            entry_count: read_u32(data, start + FOOTER_MAGIC.len())?,
        })
    }

    /// Absolute offset of the first directory record in a file of `file_len` bytes
    pub fn directory_start(&self, file_len: usize) -> Result<usize> {
        (self.entry_count as usize)
            .checked_mul(DIRECTORY_RECORD_SIZE)
            .and_then(|size| size.checked_add(FOOTER_SIZE))
            .and_then(|tail| file_len.checked_sub(tail))
            .ok_or_else(|| {
                BnkError::OutOfBounds(format!(
                    "Directory of {} records does not fit in a {}-byte file",
                    self.entry_count, file_len
                ))
            })
    }

    /// Write the footer, returning the number of bytes written
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        writer.write_all(&FOOTER_MAGIC)?;
        writer.write_all(&self.entry_count.to_le_bytes())?;
        Ok(FOOTER_SIZE)
    }
}
