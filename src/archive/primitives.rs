//! Bounds-checked little-endian reads over an in-memory buffer.
//!
//! Every read requires `offset + width <= data.len()`. Anything else is a
//! [`BnkError::Bounds`]; reads are never clamped or truncated.

use crate::archive::format::NAME_SIZE;
use crate::error::{BnkError, Result};

/// Borrow `len` bytes starting at `offset`
pub fn read_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.checked_add(len).ok_or(BnkError::Bounds {
        offset,
        width: len,
        len: data.len(),
    })?;

    data.get(offset..end).ok_or(BnkError::Bounds {
        offset,
        width: len,
        len: data.len(),
    })
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    buf.copy_from_slice(read_bytes(data, offset, N)?);
    Ok(buf)
}

pub fn read_i16(data: &[u8], offset: usize) -> Result<i16> {
    Ok(i16::from_le_bytes(read_array(data, offset)?))
}

pub fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_le_bytes(read_array(data, offset)?))
}

pub fn read_i32(data: &[u8], offset: usize) -> Result<i32> {
    Ok(i32::from_le_bytes(read_array(data, offset)?))
}

pub fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(read_array(data, offset)?))
}

/// Decode a NUL-terminated UTF-8 string, trimming surrounding whitespace
pub fn read_string(data: &[u8]) -> Result<String> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let text = std::str::from_utf8(&data[..end])
        .map_err(|e| BnkError::Format(format!("Invalid UTF-8 in string: {}", e)))?;
    Ok(text.trim().to_string())
}

/// Encode a name into the fixed, zero-padded on-disk name field
pub fn encode_name(name: &str) -> Result<[u8; NAME_SIZE]> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_SIZE {
        return Err(BnkError::Name(format!(
            "'{}' is {} bytes when encoded (max {})",
            name,
            bytes.len(),
            NAME_SIZE
        )));
    }
    if bytes.contains(&0) {
        return Err(BnkError::Name(format!("'{}' contains a NUL byte", name.escape_debug())));
    }

    let mut field = [0u8; NAME_SIZE];
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(field)
}
