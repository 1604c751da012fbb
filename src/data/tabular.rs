// ============================================================
// Layer 4 — Tabular Loader
// ============================================================
// Reads an extracted CSV file into memory as a Table:
// a header row plus rows of trimmed string cells.
//
// The loader is deliberately schema-free. Deciding which column
// is the label and which columns are numeric is the trainer's job
// (Layer 5), not the data layer's.
//
// Reference: csv crate documentation (ReaderBuilder)
//            Rust Book §8 (Collections)

use anyhow::{bail, Context, Result};
use std::path::Path;

/// An in-memory CSV table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows:    Vec<Vec<String>>,
}

impl Table {
    /// Load a CSV file with a mandatory header row.
    /// Every row must have as many cells as the header.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Cannot open CSV '{}'", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Cannot read CSV header of '{}'", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() || headers.iter().all(String::is_empty) {
            bail!("CSV '{}' has no header row", path.display());
        }

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            // csv enforces a consistent field count unless `flexible` is set
            let record = record.with_context(|| {
                format!("Malformed row {} in '{}'", line + 2, path.display())
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!(
            "Loaded {} rows x {} columns from '{}'",
            rows.len(),
            headers.len(),
            path.display()
        );

        Ok(Self { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Case-insensitive lookup of a column by header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Iterate over one column's cells
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_loads_header_and_rows() {
        let (_dir, path) = write_csv("a, b ,Label\n1,2,0\n3, 4 ,1\n");
        let table = Table::from_csv(&path).unwrap();

        assert_eq!(table.headers, vec!["a", "b", "Label"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["3", "4", "1"]);
        assert_eq!(table.column_index("label"), Some(2));
        assert_eq!(table.column(0).collect::<Vec<_>>(), vec!["1", "3"]);
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let (_dir, path) = write_csv("a,b\n1,2\n3\n");
        let err = Table::from_csv(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Malformed row 3"));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let (_dir, path) = write_csv("");
        assert!(Table::from_csv(&path).is_err());
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let (_dir, path) = write_csv("x,y\n");
        let table = Table::from_csv(&path).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }
}
