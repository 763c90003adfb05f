//! # Storage — the SnailDB persistence codec
//!
//! Serializes a [`table::Table`] to a compact, self-describing binary file
//! and back. The format is little-endian and byte-packed with no padding.
//!
//! ## File layout (v1)
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ HEADER                                          │
//! │ magic (4 bytes "SNAL") | row_count (u32)        │
//! │ col_count (u32)                                 │
//! ├─────────────────────────────────────────────────┤
//! │ SCHEMA (col_count entries)                      │
//! │ type (u8, 0 = Str / 1 = Int) | max_length (u16) │
//! │ name_len (u8) | name bytes                      │
//! ├─────────────────────────────────────────────────┤
//! │ COLUMN PAYLOADS (schema order)                  │
//! │ Int: row_count × i32                            │
//! │ Str: dict_size (u16)                            │
//! │      per entry: str_len (u16) | bytes           │
//! │      tokens: row_count × u16                    │
//! ├─────────────────────────────────────────────────┤
//! │ LIFECYCLE TRAILER (optional, see below)         │
//! │ active: row_count bytes (1 = active)            │
//! │ timestamps: row_count × u32                     │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! A file ending immediately after the column payloads loads with a
//! synthesized all-true `active` bitmap and all-zero timestamps, so tables
//! written before the lifecycle trailer existed keep loading.
//!
//! Sort flags and hash indexes are not persisted: a loaded column starts
//! unsorted and unindexed, and callers re-run `create_index()` before a
//! read-heavy phase.

use std::io;

use thiserror::Error;

mod format;
mod reader;
mod writer;

pub use format::MAGIC;
pub use reader::load;
pub use writer::save;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("not a snail table file (bad magic)")]
    BadMagic,
    #[error("malformed file: {0}")]
    Malformed(&'static str),
}
