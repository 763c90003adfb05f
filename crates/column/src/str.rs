use crate::{hash_str, pad, IndexEntry, MAX_DICT_ENTRIES, MAX_INDEXED_ROWS};

use tracing::warn;

/// A dictionary-compressed string column.
///
/// Every value is canonicalized to *padded form* (left-padded with spaces to
/// exactly `max_length`, or truncated) before storage. The dictionary holds
/// each distinct padded string once; rows store 16-bit tokens into it.
///
/// The dictionary is **append-only**: compaction drops tokens but never
/// dictionary entries, trading space after heavy churn for simplicity on
/// small devices.
#[derive(Debug, Clone)]
pub struct StrColumn {
    dictionary: Vec<String>,
    tokens: Vec<u16>,
    sorted: bool,
    index: Vec<IndexEntry>,
    max_length: usize,
}

impl StrColumn {
    /// Creates an empty column whose values are padded to `max_length`.
    pub fn new(max_length: usize) -> Self {
        Self {
            dictionary: Vec::new(),
            tokens: Vec::new(),
            sorted: true,
            index: Vec::new(),
            max_length,
        }
    }

    /// The fixed width every stored value is padded to.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Number of rows stored (tokens, not dictionary entries).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Capacity hint for the token vector; no semantic change.
    pub fn reserve(&mut self, rows: usize) {
        self.tokens.reserve(rows);
    }

    /// `true` iff the token-dereferenced padded strings are non-decreasing.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn is_indexed(&self) -> bool {
        !self.index.is_empty()
    }

    /// The deduplicated padded strings, in first-appearance order.
    /// Used by the persistence writer.
    pub fn dictionary(&self) -> &[String] {
        &self.dictionary
    }

    /// The per-row tokens. Used by the persistence writer.
    pub fn tokens(&self) -> &[u16] {
        &self.tokens
    }

    /// Appends one value.
    ///
    /// The padded form is looked up in the dictionary (linear scan; the
    /// dictionary stays small on the devices this targets) and interned on
    /// miss. When the dictionary is already at [`MAX_DICT_ENTRIES`], the row
    /// falls back to token 0 — a documented lossy overflow; the event is
    /// reported through `tracing` so hosts can observe it.
    pub fn append(&mut self, value: &str) {
        let padded = pad(value, self.max_length);
        let token = match self.dictionary.iter().position(|entry| *entry == padded) {
            Some(at) => at as u16,
            None if self.dictionary.len() < MAX_DICT_ENTRIES => {
                self.dictionary.push(padded);
                (self.dictionary.len() - 1) as u16
            }
            None => {
                warn!(
                    width = self.max_length,
                    value, "string dictionary full; falling back to token 0"
                );
                0
            }
        };
        // Compare what will actually be stored, so the flag stays truthful
        // even on the overflow fallback.
        if self.sorted {
            if let Some(&last) = self.tokens.last() {
                if self.dictionary[token as usize] < self.dictionary[last as usize] {
                    self.sorted = false;
                }
            }
        }
        self.tokens.push(token);
        self.index.clear();
    }

    /// Bounds-checked read of the padded value at `row`; out-of-range rows
    /// (or dangling tokens after a raw load) yield `""`.
    pub fn get(&self, row: usize) -> &str {
        let Some(&token) = self.tokens.get(row) else {
            return "";
        };
        self.dictionary
            .get(token as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Single-column equality search returning the first matching row.
    ///
    /// The pattern is padded, then resolved to a dictionary token. A pattern
    /// absent from the dictionary cannot be in any row, so the search
    /// fast-fails without touching the token vector. Otherwise the strategy
    /// is indexed, sorted, or linear, in that order of preference.
    pub fn find(&self, pattern: &str) -> Option<usize> {
        let padded = pad(pattern, self.max_length);
        let target = self.dictionary.iter().position(|entry| *entry == padded)? as u16;

        if !self.index.is_empty() {
            return self.find_indexed(&padded, target);
        }
        if self.sorted {
            let pos = self
                .tokens
                .partition_point(|&t| self.dictionary[t as usize].as_str() < padded.as_str());
            return (pos < self.tokens.len() && self.tokens[pos] == target).then_some(pos);
        }
        self.tokens.iter().position(|&t| t == target)
    }

    fn find_indexed(&self, padded: &str, target: u16) -> Option<usize> {
        let hash = hash_str(padded);
        let mut at = self.index.partition_point(|e| e.hash < hash);
        while at < self.index.len() && self.index[at].hash == hash {
            let row = self.index[at].row as usize;
            if self.tokens[row] == target {
                return Some(row);
            }
            at += 1;
        }
        None
    }

    /// Rebuilds the hash index. Hashes the dereferenced dictionary string of
    /// each row, not the token, so probes can hash the pattern directly.
    /// No-op for empty columns and for columns beyond 16-bit row addressing.
    pub fn create_index(&mut self) {
        if self.tokens.is_empty() || self.tokens.len() > MAX_INDEXED_ROWS {
            return;
        }
        self.index = self
            .tokens
            .iter()
            .enumerate()
            .map(|(row, &t)| IndexEntry {
                hash: hash_str(&self.dictionary[t as usize]),
                row: row as u16,
            })
            .collect();
        self.index.sort_by_key(|e| e.hash);
    }

    /// Compacts the token vector in place; the dictionary is never touched.
    /// The sorted flag and the index are cleared unconditionally. A mask
    /// whose length does not match is ignored.
    pub fn compact(&mut self, keep: &[bool]) {
        if keep.len() != self.tokens.len() {
            return;
        }
        let mut dst = 0;
        for src in 0..self.tokens.len() {
            if keep[src] {
                self.tokens[dst] = self.tokens[src];
                dst += 1;
            }
        }
        self.tokens.truncate(dst);
        self.sorted = false;
        self.index.clear();
    }

    /// Replaces dictionary and tokens wholesale. Persistence hook for the
    /// reader; the loaded column starts unsorted and unindexed.
    pub fn load_raw(&mut self, dictionary: Vec<String>, tokens: Vec<u16>) {
        self.dictionary = dictionary;
        self.tokens = tokens;
        self.sorted = false;
        self.index.clear();
    }
}
