//! Extracted table model.

use serde::{Deserialize, Serialize};

/// A table extracted from the first page of a PDF.
///
/// Stored as a JSON array of rows of cell strings; ragged rows are
/// preserved as extracted, so `n_cols` reports the widest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Whether any cell holds non-whitespace text.
    pub fn has_content(&self) -> bool {
        self.rows
            .iter()
            .any(|row| row.iter().any(|cell| !cell.trim().is_empty()))
    }

    /// Serialize the rows (not the wrapper) for the `table_json` column.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.rows)
    }

    /// Parse rows back from a `table_json` value.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        Ok(Self {
            rows: serde_json::from_str(raw)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_cells() {
        let table = ExtractedTable::new(vec![
            vec!["Indicator".to_string(), "Value".to_string()],
            vec!["CPI".to_string(), "186.2".to_string()],
        ]);
        let json = table.to_json().unwrap();
        assert_eq!(json, r#"[["Indicator","Value"],["CPI","186.2"]]"#);
        assert_eq!(ExtractedTable::from_json(&json).unwrap(), table);
    }

    #[test]
    fn dimensions_report_widest_row() {
        let table = ExtractedTable::new(vec![
            vec!["a".to_string()],
            vec!["b".to_string(), "c".to_string(), "d".to_string()],
        ]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 3);
    }

    #[test]
    fn blank_cells_do_not_count_as_content() {
        let empty = ExtractedTable::new(vec![vec!["  ".to_string(), String::new()]]);
        assert!(!empty.has_content());
        let full = ExtractedTable::new(vec![vec![String::new(), "x".to_string()]]);
        assert!(full.has_content());
    }
}
