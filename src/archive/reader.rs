use crate::archive::entry::BnkEntry;
use crate::archive::footer::Footer;
use crate::archive::format::{DirectoryRecord, DIRECTORY_RECORD_SIZE};
use crate::error::Result;
use tracing::debug;

/// Parse every entry out of a complete archive image
///
/// The footer magic is checked before any directory record is touched.
/// Entry data is captured in its stored form; nothing is decompressed here.
pub(crate) fn read_entries(archive: &[u8]) -> Result<Vec<BnkEntry>> {
    let footer = Footer::parse(archive)?;
    let directory_start = footer.directory_start(archive.len())?;

    debug!(
        entry_count = footer.entry_count,
        directory_start,
        file_len = archive.len(),
        "reading archive directory"
    );

    let mut entries = Vec::with_capacity(footer.entry_count as usize);
    for index in 0..footer.entry_count as usize {
        let record = DirectoryRecord::parse(archive, directory_start + index * DIRECTORY_RECORD_SIZE)?;
        entries.push(BnkEntry::from_record(archive, &record)?);
    }

    Ok(entries)
}
