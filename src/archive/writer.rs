use crate::archive::entry::BnkEntry;
use crate::archive::footer::{Footer, FOOTER_SIZE};
use crate::archive::format::{DirectoryRecord, DIRECTORY_RECORD_SIZE};
use crate::error::{BnkError, Result};
use std::io::Write;

/// Serialize entries in the order given, returning the number of bytes written
///
/// Layout: every data block back to back, then one directory record per
/// entry in the same order, then the footer. Each record stores the distance
/// from the end of the file back to the start of its data block.
pub(crate) fn write_entries<W: Write>(entries: &[BnkEntry], mut writer: W) -> Result<usize> {
    let records = build_directory(entries)?;
    let mut bytes_written = 0;

    for entry in entries {
        writer.write_all(entry.data())?;
        bytes_written += entry.data().len();
    }

    for record in &records {
        bytes_written += record.write_to(&mut writer)?;
    }

    bytes_written += Footer::new(records.len() as u32).write_to(&mut writer)?;
    writer.flush()?;

    Ok(bytes_written)
}

/// Compute the directory records for `entries` laid out in order
fn build_directory(entries: &[BnkEntry]) -> Result<Vec<DirectoryRecord>> {
    let entry_count = u32::try_from(entries.len())
        .map_err(|_| BnkError::OutOfBounds(format!("{} entries do not fit in the footer", entries.len())))?;

    // Start from the size of the directory plus footer, then add every data
    // block: the first record then points at offset 0 of the file.
    let mut offset_from_end = entries.len() as u64 * DIRECTORY_RECORD_SIZE as u64 + FOOTER_SIZE as u64;
    for entry in entries {
        offset_from_end += entry.data().len() as u64;
    }

    let mut records = Vec::with_capacity(entry_count as usize);
    for entry in entries {
        let stored_size = to_u32(entry.data().len() as u64, &entry.name(), "data length")?;
        records.push(DirectoryRecord {
            name: *entry.name_bytes(),
            offset_from_end: to_u32(offset_from_end, &entry.name(), "offset from end")?,
            stored_size,
            uncompressed_size: entry.uncompressed_size(),
            compression_flag: entry.is_compressed() as u32,
        });
        offset_from_end -= stored_size as u64;
    }

    Ok(records)
}

fn to_u32(value: u64, name: &str, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        BnkError::OutOfBounds(format!(
            "Entry '{}' {} of {} does not fit in 4 bytes",
            name, field, value
        ))
    })
}
