//! # Table
//!
//! The SnailDB table façade: a fixed schema of named, typed columns over an
//! append-only stream of rows, with soft-delete lifecycle and a read cursor.
//!
//! ## Key properties
//! - **Columnar**: each schema field is backed by its own [`column::Column`];
//!   no cross-column references exist.
//! - **Single-writer, single-reader**: no operation suspends or blocks; the
//!   unit of external mutual exclusion is the whole [`Table`].
//! - **Sentinel-based failure**: schema or insert mismatches degrade to
//!   silent no-ops, getters return defaults out of range, lookups return
//!   `None`. No core operation can fail loudly.
//! - **Lifecycle overlay**: an `active` bitmap and a timestamp vector run
//!   parallel to the rows. Soft deletes flip bits, expiry scans timestamps,
//!   [`purge`](Table::purge) compacts everything in lockstep.
//!
//! ## Example
//! ```rust
//! use table::Table;
//!
//! let mut t = Table::new();
//! t.add_int_column("id", 0);
//! t.add_str_column("name", 10);
//! t.insert_at(100, &[1.into(), "Alice".into()]);
//! t.insert_at(200, &[2.into(), "Bob".into()]);
//!
//! assert_eq!(t.find_row("name", "Bob"), Some(1));
//! t.soft_delete(1);
//! assert_eq!(t.find_row("name", "Bob"), None);
//! assert_eq!(t.size(), 1);
//! ```

use column::{Column, ColumnKind, IntColumn, StrColumn};

/// One cell value for a typed insert.
///
/// This is the row-side contract of the insert surface: the table consumes
/// only the per-position tags and payloads. `From` impls keep call sites
/// short: `t.insert_at(ts, &[1.into(), "Alice".into()])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Int(i32),
    Str(&'a str),
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(s)
    }
}

/// Schema entry for one column, frozen at definition time.
///
/// `max_length` is the padding width for string columns; for integer columns
/// it is advisory only and not enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub max_length: usize,
    pub kind: ColumnKind,
}

/// A decoded column payload, handed to [`Table::restore`] by the
/// persistence reader.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Int(Vec<i32>),
    Str {
        dictionary: Vec<String>,
        tokens: Vec<u16>,
    },
}

/// An embedded columnar table: ordered schema, column vector, lifecycle
/// overlays and a read cursor.
///
/// The table exclusively owns its columns and overlays. At every public
/// entry and exit, `active`, `timestamps` and every column share the same
/// logical length, `row_count`.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Vec<ColumnInfo>,
    columns: Vec<Column>,
    active: Vec<bool>,
    timestamps: Vec<u32>,
    row_count: usize,
    cursor: usize,
}

impl Table {
    /// Creates an empty table with no schema.
    pub fn new() -> Self {
        Self {
            schema: Vec::new(),
            columns: Vec::new(),
            active: Vec::new(),
            timestamps: Vec::new(),
            row_count: 0,
            cursor: 0,
        }
    }

    // -------------------- Schema definition --------------------

    /// Adds an integer column. `max_length` is advisory for this kind.
    ///
    /// Silently ignored once rows exist, or when the name duplicates an
    /// existing column.
    pub fn add_int_column(&mut self, name: &str, max_length: usize) {
        if !self.can_add_column(name) {
            return;
        }
        self.schema.push(ColumnInfo {
            name: name.to_string(),
            max_length,
            kind: ColumnKind::Int,
        });
        self.columns.push(Column::Int(IntColumn::new()));
    }

    /// Adds a string column whose values are padded to `max_length`.
    ///
    /// Silently ignored once rows exist, or when the name duplicates an
    /// existing column.
    pub fn add_str_column(&mut self, name: &str, max_length: usize) {
        if !self.can_add_column(name) {
            return;
        }
        self.schema.push(ColumnInfo {
            name: name.to_string(),
            max_length,
            kind: ColumnKind::Str,
        });
        self.columns.push(Column::Str(StrColumn::new(max_length)));
    }

    fn can_add_column(&self, name: &str) -> bool {
        self.row_count == 0 && !self.schema.iter().any(|info| info.name == name)
    }

    /// Hints capacity on every column and both overlays. No semantic change.
    pub fn reserve(&mut self, rows: usize) {
        for col in &mut self.columns {
            col.reserve(rows);
        }
        self.active.reserve(rows);
        self.timestamps.reserve(rows);
    }

    // -------------------- Schema introspection --------------------

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn column_name(&self, at: usize) -> Option<&str> {
        self.schema.get(at).map(|info| info.name.as_str())
    }

    pub fn column_kind(&self, at: usize) -> Option<ColumnKind> {
        self.schema.get(at).map(|info| info.kind)
    }

    pub fn schema(&self) -> &[ColumnInfo] {
        &self.schema
    }

    pub fn column(&self, at: usize) -> Option<&Column> {
        self.columns.get(at)
    }

    /// All columns in schema order. Used by the persistence writer.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    // -------------------- Insert --------------------

    /// Inserts a row with timestamp `0`.
    ///
    /// Timestamps are caller-supplied throughout; this is sugar for hosts
    /// that never use expiry. See [`insert_at`](Table::insert_at).
    pub fn insert(&mut self, values: &[Value]) {
        self.insert_at(0, values);
    }

    /// Inserts a row: one value per column in schema order, plus the
    /// lifecycle overlay slots (`active = true`, the given timestamp).
    ///
    /// Arity and per-position type are validated against the schema before
    /// anything is appended; a mismatch (or an empty schema) is a silent
    /// no-op, so a failed insert never leaves columns with uneven lengths.
    pub fn insert_at(&mut self, timestamp: u32, values: &[Value]) {
        if self.columns.is_empty() || values.len() != self.columns.len() {
            return;
        }
        let types_match = values
            .iter()
            .zip(&self.columns)
            .all(|(value, col)| match (value, col) {
                (Value::Int(_), Column::Int(_)) => true,
                (Value::Str(_), Column::Str(_)) => true,
                _ => false,
            });
        if !types_match {
            return;
        }

        for (value, col) in values.iter().zip(self.columns.iter_mut()) {
            match (value, col) {
                (Value::Int(v), Column::Int(ints)) => ints.append(*v),
                (Value::Str(s), Column::Str(strs)) => strs.append(s),
                _ => {}
            }
        }
        self.active.push(true);
        self.timestamps.push(timestamp);
        self.row_count += 1;
    }

    // -------------------- Search --------------------

    /// Single-column equality search: resolves `col_name` against the
    /// schema, delegates to the column's adaptive `find`, and demotes hits
    /// on soft-deleted rows to `None`. Callers never see deleted rows.
    pub fn find_row(&self, col_name: &str, pattern: &str) -> Option<usize> {
        let at = self.schema.iter().position(|info| info.name == col_name)?;
        let row = self.columns[at].find(pattern)?;
        if !self.active.get(row).copied().unwrap_or(false) {
            return None;
        }
        Some(row)
    }

    /// Rebuilds the hash index on every column. Indexing is opportunistic:
    /// each subsequent find uses its column's index until a mutation drops
    /// it again.
    pub fn create_index(&mut self) {
        for col in &mut self.columns {
            col.create_index();
        }
    }

    // -------------------- Lifecycle --------------------

    /// Marks a row as logically absent. Idempotent; out-of-range rows are
    /// ignored. Reversible only until the next [`purge`](Table::purge).
    pub fn soft_delete(&mut self, row: usize) {
        if let Some(slot) = self.active.get_mut(row) {
            *slot = false;
        }
    }

    /// Soft-deletes every row whose timestamp is strictly below `threshold`.
    /// Already-inactive rows are unaffected.
    pub fn delete_older_than(&mut self, threshold: u32) {
        for (row, &ts) in self.timestamps.iter().enumerate() {
            if ts < threshold {
                self.active[row] = false;
            }
        }
    }

    /// Physically removes soft-deleted rows: compacts every column and the
    /// timestamp overlay with the active bitmap as keep-mask, then resets
    /// the bitmap to all-true of the surviving length.
    ///
    /// Compaction is deterministic and order-preserving. A cursor that fell
    /// past the new end is clamped to the last row.
    pub fn purge(&mut self) {
        if self.active.is_empty() {
            return;
        }
        for col in &mut self.columns {
            col.compact(&self.active);
        }
        let mut dst = 0;
        for src in 0..self.timestamps.len() {
            if self.active[src] {
                self.timestamps[dst] = self.timestamps[src];
                dst += 1;
            }
        }
        self.timestamps.truncate(dst);

        self.row_count = dst;
        self.active.clear();
        self.active.resize(dst, true);
        if self.cursor >= self.row_count && self.row_count > 0 {
            self.cursor = self.row_count - 1;
        }
    }

    /// Count of active (non-soft-deleted) rows — not storage length.
    pub fn size(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// Physical row count, including soft-deleted rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// The active bitmap, one slot per physical row. Used by the
    /// persistence writer.
    pub fn active(&self) -> &[bool] {
        &self.active
    }

    /// Per-row insert timestamps. Used by the persistence writer.
    pub fn timestamps(&self) -> &[u32] {
        &self.timestamps
    }

    // -------------------- Cursor --------------------

    /// Current cursor position. Advisory; always within `[0, row_count]`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Places the cursor on the first active row, or 0 if none is active.
    pub fn reset(&mut self) {
        self.cursor = 0;
        if self.row_count > 0 && !self.active[0] {
            self.next();
        }
    }

    /// Advances the cursor, skipping inactive rows. Walking past the end of
    /// a non-empty table clamps back to the last active row.
    pub fn next(&mut self) {
        if self.cursor < self.row_count {
            self.cursor += 1;
        }
        while self.cursor < self.row_count && !self.active[self.cursor] {
            self.cursor += 1;
        }
        if self.cursor >= self.row_count && self.row_count > 0 {
            self.tail();
        }
    }

    /// Moves the cursor backward, skipping inactive rows. Cannot cross 0.
    pub fn previous(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        while self.cursor > 0 && !self.active[self.cursor] {
            self.cursor -= 1;
        }
    }

    /// Places the cursor on the last active row, or 0 when empty.
    pub fn tail(&mut self) {
        if self.row_count == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.row_count - 1;
        while self.cursor > 0 && !self.active[self.cursor] {
            self.cursor -= 1;
        }
    }

    /// Reads the integer cell of column `col` at the cursor. Non-integer
    /// columns and out-of-range reads yield `0`.
    pub fn get_int(&self, col: usize) -> i32 {
        self.columns
            .get(col)
            .and_then(Column::as_int)
            .map(|ints| ints.get(self.cursor))
            .unwrap_or(0)
    }

    /// Reads the padded string cell of column `col` at the cursor.
    /// Non-string columns and out-of-range reads yield `""`.
    pub fn get_str(&self, col: usize) -> &str {
        self.columns
            .get(col)
            .and_then(Column::as_str)
            .map(|strs| strs.get(self.cursor))
            .unwrap_or("")
    }

    // -------------------- Persistence hook --------------------

    /// Installs decoded column payloads and lifecycle overlays wholesale.
    ///
    /// The persistence reader calls this after reconstructing the schema:
    /// payload count and kinds must match the columns, every payload must
    /// have one slot per overlay row, and string tokens must reference
    /// their dictionary. On any mismatch nothing is installed and `false`
    /// is returned, leaving the table with its schema but no rows.
    pub fn restore(
        &mut self,
        payloads: Vec<ColumnData>,
        active: Vec<bool>,
        timestamps: Vec<u32>,
    ) -> bool {
        if payloads.len() != self.columns.len() {
            return false;
        }
        let rows = active.len();
        if timestamps.len() != rows {
            return false;
        }
        let aligned = payloads
            .iter()
            .zip(&self.columns)
            .all(|(payload, col)| match (payload, col) {
                (ColumnData::Int(values), Column::Int(_)) => values.len() == rows,
                (ColumnData::Str { dictionary, tokens }, Column::Str(_)) => {
                    tokens.len() == rows
                        && tokens.iter().all(|&t| (t as usize) < dictionary.len())
                }
                _ => false,
            });
        if !aligned {
            return false;
        }

        for (payload, col) in payloads.into_iter().zip(self.columns.iter_mut()) {
            match (payload, col) {
                (ColumnData::Int(values), Column::Int(ints)) => ints.load_raw(values),
                (ColumnData::Str { dictionary, tokens }, Column::Str(strs)) => {
                    strs.load_raw(dictionary, tokens)
                }
                _ => {}
            }
        }
        self.active = active;
        self.timestamps = timestamps;
        self.row_count = rows;
        self.cursor = 0;
        true
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
