// src/table/mod.rs

use std::collections::HashMap;

use tracing::warn;

/// One worksheet snapshot: a header row plus data rows, every cell a string.
///
/// The sheet is loosely typed, so no conversion happens here; callers trim
/// and parse cells as they need them. Rows shorter than the header are padded
/// with empty cells, rows longer than the header are truncated (extra cells
/// have no column name to live under).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Table { headers, rows }
    }

    /// Build a table from raw sheet values: first row is the header, the rest
    /// are data. Fully-empty rows are dropped.
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Table {
                headers: Vec::new(),
                rows: Vec::new(),
            };
        }
        let headers: Vec<String> = values
            .remove(0)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        let width = headers.len();

        let mut oversized = 0usize;
        let rows: Vec<Vec<String>> = values
            .into_iter()
            .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
            .map(|mut row| {
                if row.len() > width {
                    oversized += 1;
                    row.truncate(width);
                }
                while row.len() < width {
                    row.push(String::new());
                }
                row
            })
            .collect();

        if oversized > 0 {
            warn!(
                "{} rows had more cells than the {} header columns; extras dropped",
                oversized, width
            );
        }

        Table { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Index of the named column, comparing trimmed header text exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers.iter().position(|h| h.trim() == wanted)
    }

    /// Resolve a logical column by trying candidate header names in priority
    /// order; the first candidate present wins. Absence is not an error.
    pub fn resolve_column(&self, candidates: &[&str]) -> Option<usize> {
        candidates.iter().find_map(|c| self.column_index(c))
    }

    /// Trimmed cell text; out-of-bounds reads come back empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|c| c.trim())
            .unwrap_or("")
    }

    /// All cells of one column, trimmed, in row order.
    pub fn column(&self, col: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.get(col).map(|c| c.trim()).unwrap_or(""))
            .collect()
    }

    /// New table holding the given rows (by index, in the order given) over
    /// the same columns.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Frequency table over one categorical column: label -> count, sorted by
    /// count descending then label ascending. Empty cells are skipped.
    pub fn value_counts(&self, col: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for row in &self.rows {
            let cell = row.get(col).map(|c| c.trim()).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            *counts.entry(cell.to_string()).or_insert(0) += 1;
        }
        let mut out: Vec<(String, usize)> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Count of distinct non-empty values in one column.
    pub fn nunique(&self, col: usize) -> usize {
        self.value_counts(col).len()
    }
}
