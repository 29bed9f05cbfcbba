//! Text-safe projection of an entry.
//!
//! Binary fields are carried as standard (padded) Base64 so entries can be
//! embedded in patch plans, JSON caches or anywhere raw bytes can't go.

use crate::archive::entry::BnkEntry;
use crate::archive::format::NAME_SIZE;
use crate::error::{BnkError, Result};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::{Deserialize, Serialize};

/// Lossless, text-safe form of a [`BnkEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableEntry {
    /// Base64 of the entry data, in its stored (possibly compressed) form
    pub data: String,
    /// Base64 of the full 32-byte name field
    pub name: String,
    pub uncompressed_size: u32,
    pub is_compressed: u32,
}

impl PortableEntry {
    /// Rebuild the entry this projection was made from
    pub fn to_entry(&self) -> Result<BnkEntry> {
        BnkEntry::try_from(self)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as a TOML inline table, ready to paste into a patch plan step
    pub fn to_literal(&self) -> String {
        format!(
            "{{ data = \"{}\", name = \"{}\", uncompressedSize = {}, isCompressed = {} }}",
            self.data, self.name, self.uncompressed_size, self.is_compressed
        )
    }
}

impl From<&BnkEntry> for PortableEntry {
    fn from(entry: &BnkEntry) -> Self {
        Self {
            data: BASE64_STANDARD.encode(entry.data()),
            name: BASE64_STANDARD.encode(entry.name_bytes()),
            uncompressed_size: entry.uncompressed_size(),
            is_compressed: entry.is_compressed() as u32,
        }
    }
}

impl TryFrom<&PortableEntry> for BnkEntry {
    type Error = BnkError;

    fn try_from(portable: &PortableEntry) -> Result<Self> {
        let name_bytes = BASE64_STANDARD.decode(portable.name.as_bytes())?;
        let name: [u8; NAME_SIZE] = name_bytes.as_slice().try_into().map_err(|_| {
            BnkError::Name(format!(
                "Portable name decodes to {} bytes, expected {}",
                name_bytes.len(),
                NAME_SIZE
            ))
        })?;
        let data = BASE64_STANDARD.decode(portable.data.as_bytes())?;

        Ok(BnkEntry::from_parts(
            name,
            data,
            portable.uncompressed_size,
            portable.is_compressed != 0,
        ))
    }
}
