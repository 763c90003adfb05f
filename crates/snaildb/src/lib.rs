//! # SnailDB
//!
//! An embedded, in-process, columnar table store for memory- and
//! flash-constrained hosts.
//!
//! A [`Table`] holds a fixed schema of named, typed columns and an
//! append-only stream of rows. On top of that:
//!
//! - **Adaptive equality search** — [`Table::find_row`] picks sorted binary
//!   search, a hash index, or a linear scan per column, based on what each
//!   column currently supports.
//! - **Dictionary-compressed strings** — each string column stores distinct
//!   padded values once and 16-bit tokens per row.
//! - **Row lifecycle** — soft delete, timestamp expiry, and physical
//!   [`purge`](Table::purge) compaction.
//! - **Binary persistence** — [`save`] / [`load`] round-trip a table through
//!   a compact little-endian file, soft deletions included.
//!
//! This crate re-exports the public surface of the `column`, `table` and
//! `storage` member crates.
//!
//! ## Example
//! ```rust
//! use snaildb::Table;
//!
//! let mut db = Table::new();
//! db.add_int_column("id", 0);
//! db.add_str_column("name", 10);
//!
//! db.insert_at(100, &[1.into(), "Alice".into()]);
//! db.insert_at(200, &[2.into(), "Bob".into()]);
//!
//! assert_eq!(db.find_row("name", "Bob"), Some(1));
//!
//! db.soft_delete(1);
//! assert_eq!(db.find_row("name", "Bob"), None);
//! db.purge();
//! assert_eq!(db.row_count(), 1);
//! ```

pub use column::{
    hash_int, hash_str, pad, Column, ColumnKind, IndexEntry, IntColumn, StrColumn,
    MAX_DICT_ENTRIES, MAX_INDEXED_ROWS,
};
pub use storage::{load, save, StorageError, MAGIC};
pub use table::{ColumnData, ColumnInfo, Table, Value};
