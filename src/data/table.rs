//! Named numeric columns over a shared set of rows.

use crate::error::{Result, StatsError};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A table of named numeric series sharing one row index.
///
/// Rows are typically cell lines and columns are genes, compounds or other
/// measured features. Cells may be missing.
#[derive(Debug, Clone, Default)]
pub struct SeriesTable {
    /// Row identifiers.
    row_ids: Vec<String>,
    /// Columns in file order.
    columns: IndexMap<String, Vec<Option<f64>>>,
}

impl SeriesTable {
    /// Create a table from in-memory columns.
    ///
    /// Row identifiers are generated as `row_0`, `row_1`, ...
    pub fn from_columns(columns: IndexMap<String, Vec<Option<f64>>>) -> Result<Self> {
        let n_rows = columns.values().next().map(Vec::len).unwrap_or(0);
        for values in columns.values() {
            if values.len() != n_rows {
                return Err(StatsError::LengthMismatch {
                    left: n_rows,
                    right: values.len(),
                });
            }
        }
        let row_ids = (0..n_rows).map(|i| format!("row_{}", i)).collect();
        Ok(Self { row_ids, columns })
    }

    /// Load a table from a TSV file.
    ///
    /// Expected format:
    /// - First row: header, first cell names the row-id column
    /// - Subsequent rows: row ID followed by one value per column
    ///
    /// Empty cells and `NA`, `NaN`, `null` are missing values.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a table from any buffered TSV source.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| StatsError::EmptyData("Empty TSV input".to_string()))??;
        let header: Vec<&str> = header_line.trim_end_matches('\r').split('\t').collect();
        if header.len() < 2 {
            return Err(StatsError::EmptyData(
                "TSV must have at least one data column".to_string(),
            ));
        }
        let names: Vec<String> = header[1..].iter().map(|s| s.trim().to_string()).collect();
        let n_columns = names.len();

        let mut row_ids = Vec::new();
        let mut cells: Vec<Vec<Option<f64>>> = vec![Vec::new(); n_columns];

        for line_result in lines {
            let line = line_result?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            // Index among data rows, blank lines excluded
            let row_idx = row_ids.len();
            let fields: Vec<&str> = line.split('\t').collect();
            row_ids.push(fields[0].to_string());

            for (col_idx, column) in cells.iter_mut().enumerate() {
                let value = match fields.get(col_idx + 1) {
                    Some(raw) => parse_cell(raw).ok_or_else(|| StatsError::InvalidValue {
                        value: raw.to_string(),
                        row: row_idx,
                        col: col_idx,
                    })?,
                    None => None,
                };
                column.push(value);
            }
        }

        if row_ids.is_empty() {
            return Err(StatsError::EmptyData("No rows in TSV".to_string()));
        }

        let mut columns = IndexMap::with_capacity(n_columns);
        for (name, values) in names.into_iter().zip(cells) {
            if columns.insert(name.clone(), values).is_some() {
                return Err(StatsError::InvalidParameter(format!(
                    "Duplicate column '{}'",
                    name
                )));
            }
        }

        Ok(Self { row_ids, columns })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.row_ids.len()
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Row identifiers.
    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Values of a column.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Values of a column, or an error naming the missing column.
    pub fn require(&self, name: &str) -> Result<&[Option<f64>]> {
        self.column(name)
            .ok_or_else(|| StatsError::MissingColumn(name.to_string()))
    }

    /// Columns as an insertion-ordered map.
    pub fn series(&self) -> &IndexMap<String, Vec<Option<f64>>> {
        &self.columns
    }

    /// Copy out the columns as an owned map.
    pub fn to_series_map(&self) -> IndexMap<String, Vec<Option<f64>>> {
        self.columns.clone()
    }

    /// Keep only the named columns, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut columns = IndexMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let values = self.require(name)?;
            columns.insert(name.to_string(), values.to_vec());
        }
        Ok(Self {
            row_ids: self.row_ids.clone(),
            columns,
        })
    }
}

/// Parse one TSV cell. `Some(None)` is a missing value, `None` is unparseable.
fn parse_cell(raw: &str) -> Option<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
    {
        return Some(None);
    }
    trimmed.parse::<f64>().ok().map(Some)
}
