//! Dataset port: tabular training data.

use std::collections::BTreeMap;

/// Errors raised while reading or interpreting a training dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Missing training column: {0}")]
    MissingTrainingColumn(String),

    #[error("Invalid value {value:?} in column {column} (row {row})")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Missing value in column {column} (row {row})")]
    MissingValue { column: String, row: usize },

    #[error("Dataset parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column-oriented table of raw cells. `None` marks a missing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingTable {
    columns: BTreeMap<String, Vec<Option<String>>>,
    num_rows: usize,
}

impl TrainingTable {
    /// Build from a header row and data rows.
    ///
    /// # Errors
    /// Returns `DatasetError::Parse` if a header name repeats or a row is
    /// wider or narrower than the header.
    pub fn from_rows(
        headers: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
    ) -> Result<Self, DatasetError> {
        for (idx, header) in headers.iter().enumerate() {
            if headers[..idx].contains(header) {
                return Err(DatasetError::Parse(format!("duplicate column {header:?}")));
            }
        }

        let mut columns: BTreeMap<String, Vec<Option<String>>> = headers
            .iter()
            .map(|h| (h.clone(), Vec::with_capacity(rows.len())))
            .collect();

        let num_rows = rows.len();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(DatasetError::Parse(format!(
                    "row {} has {} cells, expected {}",
                    row_idx,
                    row.len(),
                    headers.len()
                )));
            }
            for (header, cell) in headers.iter().zip(row) {
                if let Some(col) = columns.get_mut(header) {
                    col.push(cell);
                }
            }
        }

        Ok(Self { columns, num_rows })
    }

    /// Cells of `name`.
    ///
    /// # Errors
    /// Returns `DatasetError::MissingTrainingColumn` if the column is absent.
    pub fn column(&self, name: &str) -> Result<&[Option<String>], DatasetError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| DatasetError::MissingTrainingColumn(name.to_string()))
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }
}

/// Source of a raw training table.
pub trait DatasetSource {
    /// Read the full table.
    ///
    /// # Errors
    /// Returns error if the source cannot be read or parsed.
    fn load_table(&self) -> Result<TrainingTable, DatasetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let table = TrainingTable::from_rows(
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec![Some("1".to_string()), None],
                vec![Some("2".to_string()), Some("x".to_string())],
            ],
        )
        .expect("Valid table");

        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("B").unwrap()[0], None);
        assert!(matches!(
            table.column("C"),
            Err(DatasetError::MissingTrainingColumn(ref c)) if c == "C"
        ));
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = TrainingTable::from_rows(
            vec!["Age".to_string(), "Gender".to_string(), "Age".to_string()],
            vec![vec![
                Some("30".to_string()),
                Some("Female".to_string()),
                Some("99".to_string()),
            ]],
        );
        assert!(matches!(err, Err(DatasetError::Parse(ref msg)) if msg.contains("Age")));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = TrainingTable::from_rows(vec!["A".to_string()], vec![vec![None, None]]);
        assert!(matches!(err, Err(DatasetError::Parse(_))));
    }
}
