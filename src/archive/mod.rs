mod bnk_archive;
mod decompress;
mod entry;
mod footer;
mod format;
mod portable;
mod primitives;
mod reader;
mod writer;

pub use bnk_archive::{AddOptions, BnkArchive, RemoveOptions};
pub use decompress::{decompress, BackReferenceDecoder, INITIAL_CURSOR, MIN_MATCH, WINDOW_SIZE};
pub use entry::BnkEntry;
pub use footer::{Footer, FOOTER_MAGIC, FOOTER_SIZE};
pub use format::{DirectoryRecord, DIRECTORY_RECORD_SIZE, NAME_SIZE};
pub use portable::PortableEntry;
pub use primitives::{
    encode_name, read_bytes, read_i16, read_i32, read_string, read_u16, read_u32,
};
