//! Binary format constants and schema-entry helpers.
//!
//! A schema entry is byte-packed as:
//!
//! ```text
//! [type: u8][max_length: u16 LE][name_len: u8][name: name_len bytes]
//! ```
//!
//! The `type` byte matches [`ColumnKind`]'s declaration order
//! (`Str = 0`, `Int = 1`).

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use column::ColumnKind;
use std::io::{Read, Write};
use table::ColumnInfo;

use crate::StorageError;

/// Magic bytes identifying a SnailDB table file ("SNAL").
pub const MAGIC: [u8; 4] = *b"SNAL";

/// Writes one schema entry. Names longer than 255 bytes are truncated to
/// fit the single-byte length prefix.
pub fn write_schema_entry<W: Write>(w: &mut W, info: &ColumnInfo) -> Result<(), StorageError> {
    let name = info.name.as_bytes();
    let name_len = name.len().min(u8::MAX as usize);
    w.write_u8(info.kind.as_u8())?;
    w.write_u16::<LittleEndian>(info.max_length as u16)?;
    w.write_u8(name_len as u8)?;
    w.write_all(&name[..name_len])?;
    Ok(())
}

/// Reads one schema entry, validating the type tag and the name encoding.
pub fn read_schema_entry<R: Read>(r: &mut R) -> Result<ColumnInfo, StorageError> {
    let kind = ColumnKind::from_u8(r.read_u8()?)
        .ok_or(StorageError::Malformed("unknown column type tag"))?;
    let max_length = r.read_u16::<LittleEndian>()? as usize;
    let name_len = r.read_u8()? as usize;
    let mut name = vec![0u8; name_len];
    r.read_exact(&mut name)?;
    let name = String::from_utf8(name)
        .map_err(|_| StorageError::Malformed("column name is not valid UTF-8"))?;
    Ok(ColumnInfo {
        name,
        max_length,
        kind,
    })
}
