use std::io;
use thiserror::Error;

/// Result type for bnk operations
pub type Result<T> = std::result::Result<T, BnkError>;

/// Unified error type for all bnk operations
#[derive(Debug, Error)]
pub enum BnkError {
    // Format errors
    #[error("Invalid archive format: {0}")]
    Format(String),

    #[error("Invalid magic in archive footer")]
    InvalidMagic,

    // Bounds errors
    #[error("Read of {width} bytes at offset {offset} exceeds buffer of {len} bytes")]
    Bounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    // Integrity errors
    #[error("Decompressed size mismatch: expected {expected} bytes, got {actual}")]
    Integrity { expected: usize, actual: usize },

    // Name errors
    #[error("Invalid entry name: {0}")]
    Name(String),

    #[error("An entry with the name '{0}' already exists")]
    DuplicateEntry(String),

    // Lookup errors
    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Collaborator errors
    #[error("Backup could not be made for '{0}'")]
    BackupUnavailable(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<toml::de::Error> for BnkError {
    fn from(err: toml::de::Error) -> Self {
        BnkError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for BnkError {
    fn from(err: toml::ser::Error) -> Self {
        BnkError::Toml(err.to_string())
    }
}

impl From<base64::DecodeError> for BnkError {
    fn from(err: base64::DecodeError) -> Self {
        BnkError::Encoding(err.to_string())
    }
}
