//! bnk-rs: Reader, editor and writer for Wildfire BNK archives
//!
//! A BNK archive stores named, optionally compressed blobs in one file with a
//! trailing directory:
//! - Entry data blocks, back to back
//! - One 48-byte directory record per entry
//! - An 18-byte footer holding the format magic and the entry count
//!
//! Compressed entries use a back-reference codec over a 4096-byte history
//! window. Only decoding is provided; entries are always supplied in their
//! stored form.
//!
//! # Example
//!
//! ```no_run
//! use bnk_rs::{AddOptions, BnkArchive, BnkEntry};
//!
//! let mut archive = BnkArchive::open("TABLE1.BNK")?;
//!
//! // Pull a copy out, decompress it, and store it under a new name
//! let mut sprite = archive.clone_entry("GHOST.SPR").expect("entry exists");
//! sprite.decompress()?;
//! archive.add_entry_as("GHOST_RAW.SPR", &sprite, AddOptions::default())?;
//!
//! // Replace an entry with new raw content
//! let title = BnkEntry::raw("TITLE.PAL", vec![0u8; 768])?;
//! archive.replace_entry(&title)?;
//!
//! archive.save()?;
//! # Ok::<(), bnk_rs::BnkError>(())
//! ```

// Core modules
pub mod archive;
pub mod backup;
pub mod error;
pub mod plan;
pub mod session;

// Re-export commonly used types
pub use archive::{
    AddOptions, BackReferenceDecoder, BnkArchive, BnkEntry, DirectoryRecord, Footer,
    PortableEntry, RemoveOptions, DIRECTORY_RECORD_SIZE, FOOTER_MAGIC, FOOTER_SIZE, NAME_SIZE,
};
pub use backup::{BackupGate, DirectoryBackup};
pub use error::{BnkError, Result};
pub use plan::{PatchPlan, PatchStep};
pub use session::{EntryPath, EntrySource, PatchSession};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        let mut image = Vec::new();
        Footer::new(0).write_to(&mut image).unwrap();
        assert_eq!(image.len(), FOOTER_SIZE);

        let mut archive = BnkArchive::from_bytes("BASICS.BNK", &image).unwrap();
        assert!(archive.is_empty());
        archive
            .add_entry(&BnkEntry::raw("HELLO.TXT", b"hello".to_vec()).unwrap(), AddOptions::default())
            .unwrap();

        let bytes = archive.to_bytes().unwrap();
        assert_eq!(bytes.len(), 5 + DIRECTORY_RECORD_SIZE + FOOTER_SIZE);

        let reloaded = BnkArchive::from_bytes("BASICS.BNK", &bytes).unwrap();
        assert_eq!(reloaded.get_entry("hello.txt").unwrap().data(), b"hello");
    }
}
