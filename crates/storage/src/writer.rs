use byteorder::{LittleEndian, WriteBytesExt};
use column::Column;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use table::Table;
use tracing::debug;

use crate::format::{write_schema_entry, MAGIC};
use crate::StorageError;

/// Serializes `table` to `path`, replacing any existing file.
///
/// Writes the magic, the row/column counts, one schema entry per column,
/// every column payload in schema order, and the lifecycle trailer (active
/// bitmap + timestamps). Soft-deleted rows are written as-is, so deletions
/// survive a save/load cycle.
///
/// The file handle is scoped to this call and released on every path,
/// including failure.
///
/// # Errors
///
/// Returns [`StorageError::Io`] on any create/write failure.
pub fn save<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), StorageError> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    w.write_all(&MAGIC)?;
    w.write_u32::<LittleEndian>(table.row_count() as u32)?;
    w.write_u32::<LittleEndian>(table.column_count() as u32)?;

    for info in table.schema() {
        write_schema_entry(&mut w, info)?;
    }

    for col in table.columns() {
        match col {
            Column::Int(ints) => {
                for &value in ints.values() {
                    w.write_i32::<LittleEndian>(value)?;
                }
            }
            Column::Str(strs) => {
                let dictionary = strs.dictionary();
                w.write_u16::<LittleEndian>(dictionary.len() as u16)?;
                for entry in dictionary {
                    w.write_u16::<LittleEndian>(entry.len() as u16)?;
                    w.write_all(entry.as_bytes())?;
                }
                for &token in strs.tokens() {
                    w.write_u16::<LittleEndian>(token)?;
                }
            }
        }
    }

    for &active in table.active() {
        w.write_u8(u8::from(active))?;
    }
    for &ts in table.timestamps() {
        w.write_u32::<LittleEndian>(ts)?;
    }

    w.flush()?;
    debug!(
        rows = table.row_count(),
        cols = table.column_count(),
        "table saved"
    );
    Ok(())
}
