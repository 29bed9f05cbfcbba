use crate::archive::primitives::{read_bytes, read_u32};
use crate::error::Result;
use std::io::Write;

/// Size of the fixed, zero-padded entry name field
pub const NAME_SIZE: usize = 32;

/// Directory record size in bytes
pub const DIRECTORY_RECORD_SIZE: usize = 48;

/// One directory record per entry, located between the data blocks and the footer
///
/// Structure (48 bytes fixed):
/// - Name: 32 bytes, NUL-padded
/// - Offset From End: uint32, distance from EOF back to the entry's data
/// - Stored Size: uint32, on-disk (possibly compressed) length
/// - Uncompressed Size: uint32
/// - Compression Flag: uint32, nonzero = compressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub name: [u8; NAME_SIZE],
    pub offset_from_end: u32,
    pub stored_size: u32,
    pub uncompressed_size: u32,
    pub compression_flag: u32,
}

impl DirectoryRecord {
    /// Parse the record starting at `offset` in the archive buffer
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let mut name = [0u8; NAME_SIZE];
        name.copy_from_slice(read_bytes(data, offset, NAME_SIZE)?);

        Ok(Self {
            name,
            offset_from_end: read_u32(data, offset + 32)?,
            stored_size: read_u32(data, offset + 36)?,
            uncompressed_size: read_u32(data, offset + 40)?,
            compression_flag: read_u32(data, offset + 44)?,
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.compression_flag != 0
    }

    /// Write the record, returning the number of bytes written
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        writer.write_all(&self.name)?;
        writer.write_all(&self.offset_from_end.to_le_bytes())?;
        writer.write_all(&self.stored_size.to_le_bytes())?;
        writer.write_all(&self.uncompressed_size.to_le_bytes())?;
        writer.write_all(&self.compression_flag.to_le_bytes())?;
        Ok(DIRECTORY_RECORD_SIZE)
    }
}
