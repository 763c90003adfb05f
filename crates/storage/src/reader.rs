use byteorder::{LittleEndian, ReadBytesExt};
use column::ColumnKind;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use table::{ColumnData, ColumnInfo, Table};
use tracing::debug;

use crate::format::{read_schema_entry, MAGIC};
use crate::StorageError;

/// Deserializes a table from `path`.
///
/// # Validation
///
/// - The magic must equal `"SNAL"`; a mismatch fails with
///   [`StorageError::BadMagic`] before any table state is built.
/// - Every schema entry must carry a known type tag and a UTF-8 name.
/// - Column payloads must decode to exactly `row_count` rows each, with
///   string tokens referencing their dictionary.
///
/// # Trailer compatibility
///
/// A file ending immediately after the column payloads (written before the
/// lifecycle trailer existed) loads with `active` all-true and zero
/// timestamps. A trailer that is present but cut short is an error.
///
/// # Errors
///
/// [`StorageError::Io`] on open/read failure, [`StorageError::BadMagic`] or
/// [`StorageError::Malformed`] on corrupt content.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Table, StorageError> {
    let file = File::open(path)?;
    let mut r = BufReader::new(file);

    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(StorageError::BadMagic);
    }

    let row_count = r.read_u32::<LittleEndian>()? as usize;
    let col_count = r.read_u32::<LittleEndian>()? as usize;

    let mut infos = Vec::with_capacity(col_count);
    for _ in 0..col_count {
        infos.push(read_schema_entry(&mut r)?);
    }

    let mut payloads = Vec::with_capacity(col_count);
    for info in &infos {
        payloads.push(read_payload(&mut r, info, row_count)?);
    }

    let (active, timestamps) = read_trailer(&mut r, row_count)?;

    let mut table = Table::new();
    for info in &infos {
        match info.kind {
            ColumnKind::Int => table.add_int_column(&info.name, info.max_length),
            ColumnKind::Str => table.add_str_column(&info.name, info.max_length),
        }
    }
    if table.column_count() != infos.len() {
        // A duplicate column name was silently refused by the façade.
        return Err(StorageError::Malformed("duplicate column name in schema"));
    }

    if !table.restore(payloads, active, timestamps) {
        return Err(StorageError::Malformed("column payloads disagree with header"));
    }

    debug!(
        rows = table.row_count(),
        cols = table.column_count(),
        "table loaded"
    );
    Ok(table)
}

fn read_payload<R: Read>(
    r: &mut R,
    info: &ColumnInfo,
    row_count: usize,
) -> Result<ColumnData, StorageError> {
    match info.kind {
        ColumnKind::Int => {
            let mut values = vec![0i32; row_count];
            r.read_i32_into::<LittleEndian>(&mut values)?;
            Ok(ColumnData::Int(values))
        }
        ColumnKind::Str => {
            let dict_size = r.read_u16::<LittleEndian>()? as usize;
            let mut dictionary = Vec::with_capacity(dict_size);
            for _ in 0..dict_size {
                let len = r.read_u16::<LittleEndian>()? as usize;
                let mut bytes = vec![0u8; len];
                r.read_exact(&mut bytes)?;
                let entry = String::from_utf8(bytes)
                    .map_err(|_| StorageError::Malformed("dictionary entry is not valid UTF-8"))?;
                dictionary.push(entry);
            }
            let mut tokens = vec![0u16; row_count];
            r.read_u16_into::<LittleEndian>(&mut tokens)?;
            Ok(ColumnData::Str { dictionary, tokens })
        }
    }
}

/// Reads the lifecycle trailer, or synthesizes it for pre-trailer files.
fn read_trailer<R: Read>(
    r: &mut R,
    row_count: usize,
) -> Result<(Vec<bool>, Vec<u32>), StorageError> {
    let mut active_bytes = vec![0u8; row_count];
    let filled = read_up_to(r, &mut active_bytes)?;
    if filled == 0 && row_count > 0 {
        return Ok((vec![true; row_count], vec![0u32; row_count]));
    }
    if filled < row_count {
        return Err(StorageError::Malformed("truncated active bitmap"));
    }

    let mut timestamps = vec![0u32; row_count];
    r.read_u32_into::<LittleEndian>(&mut timestamps)?;

    let active = active_bytes.iter().map(|&b| b != 0).collect();
    Ok((active, timestamps))
}

/// Reads until `buf` is full or EOF, returning the number of bytes read.
fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
