use crate::{hash_int, IndexEntry, MAX_INDEXED_ROWS};

/// A dense column of signed 32-bit integers.
///
/// An empty column counts as sorted. Appends that keep the sequence
/// non-decreasing preserve the sorted flag, enabling the binary-search fast
/// path in [`find`](IntColumn::find); any other append clears it. Every
/// mutation also drops the hash index.
#[derive(Debug, Clone)]
pub struct IntColumn {
    values: Vec<i32>,
    sorted: bool,
    index: Vec<IndexEntry>,
}

impl IntColumn {
    /// Creates a new, empty column.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            sorted: true,
            index: Vec::new(),
        }
    }

    /// Number of rows stored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Capacity hint; no semantic change.
    pub fn reserve(&mut self, rows: usize) {
        self.values.reserve(rows);
    }

    /// `true` iff the stored sequence is non-decreasing.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn is_indexed(&self) -> bool {
        !self.index.is_empty()
    }

    /// The raw value slice, in row order. Used by the persistence writer.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Appends one value, maintaining the sorted flag and dropping any index.
    pub fn append(&mut self, value: i32) {
        if self.sorted {
            if let Some(&last) = self.values.last() {
                if value < last {
                    self.sorted = false;
                }
            }
        }
        self.values.push(value);
        self.index.clear();
    }

    /// Bounds-checked read; out-of-range rows yield `0`.
    pub fn get(&self, row: usize) -> i32 {
        self.values.get(row).copied().unwrap_or(0)
    }

    /// Single-column equality search returning the first matching row.
    ///
    /// The pattern is parsed as a base-10 signed integer; unparseable input
    /// parses to `0` and the search proceeds with that value.
    ///
    /// Strategy selection, in order:
    /// 1. *Indexed* — hash probe into the `(hash, row)` index, walking
    ///    equal-hash entries in row order.
    /// 2. *Sorted* — binary lower bound on the value vector.
    /// 3. *Linear* — first-match scan.
    pub fn find(&self, pattern: &str) -> Option<usize> {
        let value: i32 = pattern.trim().parse().unwrap_or(0);

        if !self.index.is_empty() {
            return self.find_indexed(value);
        }
        if self.sorted {
            let pos = self.values.partition_point(|&v| v < value);
            return (pos < self.values.len() && self.values[pos] == value).then_some(pos);
        }
        self.values.iter().position(|&v| v == value)
    }

    fn find_indexed(&self, value: i32) -> Option<usize> {
        let hash = hash_int(value);
        let mut at = self.index.partition_point(|e| e.hash < hash);
        while at < self.index.len() && self.index[at].hash == hash {
            let row = self.index[at].row as usize;
            if self.values[row] == value {
                return Some(row);
            }
            at += 1;
        }
        None
    }

    /// Rebuilds the hash index: one entry per row, stable-sorted by hash so
    /// that equal hashes stay in insertion (row) order.
    ///
    /// No-op for empty columns, and for columns with more rows than a 16-bit
    /// row id can address.
    pub fn create_index(&mut self) {
        if self.values.is_empty() || self.values.len() > MAX_INDEXED_ROWS {
            return;
        }
        self.index = self
            .values
            .iter()
            .enumerate()
            .map(|(row, &v)| IndexEntry {
                hash: hash_int(v),
                row: row as u16,
            })
            .collect();
        self.index.sort_by_key(|e| e.hash);
    }

    /// Two-pointer in-place compaction: keeps row `i` iff `keep[i]`, without
    /// allocating, then truncates. The sorted flag and the index are cleared
    /// unconditionally. A mask whose length does not match is ignored.
    pub fn compact(&mut self, keep: &[bool]) {
        if keep.len() != self.values.len() {
            return;
        }
        let mut dst = 0;
        for src in 0..self.values.len() {
            if keep[src] {
                self.values[dst] = self.values[src];
                dst += 1;
            }
        }
        self.values.truncate(dst);
        self.sorted = false;
        self.index.clear();
    }

    /// Replaces the column contents wholesale. Persistence hook: the reader
    /// installs a decoded payload here instead of appending row by row.
    /// The loaded column starts unsorted and unindexed.
    pub fn load_raw(&mut self, values: Vec<i32>) {
        self.values = values;
        self.sorted = false;
        self.index.clear();
    }
}

impl Default for IntColumn {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col_from(values: &[i32]) -> IntColumn {
        let mut col = IntColumn::new();
        for &v in values {
            col.append(v);
        }
        col
    }

    // -------------------- Sorted flag --------------------

    #[test]
    fn empty_column_is_sorted() {
        assert!(IntColumn::new().is_sorted());
    }

    #[test]
    fn non_decreasing_appends_keep_sorted() {
        let col = col_from(&[1, 2, 2, 5]);
        assert!(col.is_sorted());
    }

    #[test]
    fn decreasing_append_clears_sorted() {
        let mut col = col_from(&[1, 2, 3]);
        col.append(0);
        assert!(!col.is_sorted());
    }

    #[test]
    fn sorted_flag_stays_cleared() {
        let mut col = col_from(&[3, 1]);
        assert!(!col.is_sorted());
        col.append(100);
        assert!(!col.is_sorted());
    }

    // -------------------- Bounds-checked get --------------------

    #[test]
    fn get_in_range() {
        let col = col_from(&[10, 20, 30]);
        assert_eq!(col.get(1), 20);
    }

    #[test]
    fn get_out_of_range_yields_zero() {
        let col = col_from(&[10]);
        assert_eq!(col.get(5), 0);
        assert_eq!(IntColumn::new().get(0), 0);
    }

    // -------------------- Find: sorted path --------------------

    #[test]
    fn find_via_binary_search() {
        let col = col_from(&[1, 2, 3, 9]);
        assert!(col.is_sorted());
        assert_eq!(col.find("3"), Some(2));
        assert_eq!(col.find("4"), None);
    }

    #[test]
    fn find_duplicate_returns_first_occurrence() {
        let col = col_from(&[1, 2, 2, 2, 5]);
        assert_eq!(col.find("2"), Some(1));
    }

    #[test]
    fn find_negative_values() {
        let col = col_from(&[-5, -2, 0, 7]);
        assert_eq!(col.find("-2"), Some(1));
    }

    // -------------------- Find: linear path --------------------

    #[test]
    fn find_linear_after_sort_broken() {
        let mut col = col_from(&[1, 2, 3]);
        col.append(0);
        assert!(!col.is_sorted());
        assert_eq!(col.find("0"), Some(3));
        assert_eq!(col.find("99"), None);
    }

    // -------------------- Find: parse policy --------------------

    #[test]
    fn unparseable_pattern_searches_for_zero() {
        let col = col_from(&[5, 0, 9]);
        assert_eq!(col.find("not a number"), Some(1));

        let without_zero = col_from(&[5, 9]);
        assert_eq!(without_zero.find("not a number"), None);
    }

    #[test]
    fn pattern_whitespace_is_trimmed() {
        let col = col_from(&[1, 2, 3]);
        assert_eq!(col.find("  2  "), Some(1));
    }

    // -------------------- Find: indexed path --------------------

    #[test]
    fn find_via_index() {
        let mut col = col_from(&[7, 3, 9, 1]);
        col.create_index();
        assert!(col.is_indexed());
        assert_eq!(col.find("9"), Some(2));
        assert_eq!(col.find("1"), Some(3));
        assert_eq!(col.find("42"), None);
    }

    #[test]
    fn indexed_duplicate_returns_lowest_row() {
        let mut col = col_from(&[4, 8, 4, 4]);
        col.create_index();
        assert_eq!(col.find("4"), Some(0));
    }

    #[test]
    fn index_covers_every_row() {
        let mut col = IntColumn::new();
        for i in (0..500).rev() {
            col.append(i);
        }
        col.create_index();
        for i in 0..500 {
            assert_eq!(col.find(&i.to_string()), Some((499 - i) as usize));
        }
    }

    // -------------------- Index invalidation --------------------

    #[test]
    fn append_drops_index() {
        let mut col = col_from(&[1, 2, 3]);
        col.create_index();
        assert!(col.is_indexed());
        col.append(4);
        assert!(!col.is_indexed());
    }

    #[test]
    fn create_index_on_empty_is_noop() {
        let mut col = IntColumn::new();
        col.create_index();
        assert!(!col.is_indexed());
    }

    // -------------------- Compaction --------------------

    #[test]
    fn compact_keeps_marked_rows_in_order() {
        let mut col = col_from(&[10, 20, 30, 40, 50]);
        col.compact(&[true, false, true, false, true]);
        assert_eq!(col.values(), &[10, 30, 50]);
        assert_eq!(col.len(), 3);
    }

    #[test]
    fn compact_clears_sorted_and_index() {
        let mut col = col_from(&[1, 2, 3]);
        col.create_index();
        col.compact(&[true, true, true]);
        assert!(!col.is_sorted());
        assert!(!col.is_indexed());
    }

    #[test]
    fn compact_mask_length_mismatch_is_noop() {
        let mut col = col_from(&[1, 2, 3]);
        col.compact(&[true, false]);
        assert_eq!(col.values(), &[1, 2, 3]);
        assert!(col.is_sorted());
    }

    #[test]
    fn compact_all_false_empties_the_column() {
        let mut col = col_from(&[1, 2]);
        col.compact(&[false, false]);
        assert!(col.is_empty());
    }

    // -------------------- Raw load --------------------

    #[test]
    fn load_raw_replaces_contents() {
        let mut col = col_from(&[1]);
        col.create_index();
        col.load_raw(vec![9, 8, 7]);
        assert_eq!(col.values(), &[9, 8, 7]);
        assert!(!col.is_sorted());
        assert!(!col.is_indexed());
        assert_eq!(col.find("8"), Some(1));
    }
}
