//! CSV adapter: Implementation of DatasetSource.
//!
//! Reads the survey export into a column-oriented [`TrainingTable`]. Empty
//! cells and the literals `NA`, `N/A`, `NaN` and `null` are treated as
//! missing; imputation happens later in the training pipeline.

use std::path::{Path, PathBuf};

use crate::ports::{DatasetError, DatasetSource, TrainingTable};

const MISSING_MARKERS: [&str; 5] = ["", "NA", "N/A", "NaN", "null"];

enum CsvInput {
    File(PathBuf),
    Text(String),
}

/// CSV training data, from a file or an in-memory string.
pub struct CsvDataset {
    input: CsvInput,
}

impl CsvDataset {
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            input: CsvInput::File(path.as_ref().to_path_buf()),
        }
    }

    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            input: CsvInput::Text(text.into()),
        }
    }

    fn parse(content: &str) -> Result<TrainingTable, DatasetError> {
        let mut reader = ::csv::Reader::from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| DatasetError::Parse(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DatasetError::Parse(e.to_string()))?;
            let row = record
                .iter()
                .map(|cell| {
                    let cell = cell.trim();
                    if MISSING_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(cell)) {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        TrainingTable::from_rows(headers, rows)
    }
}

impl DatasetSource for CsvDataset {
    fn load_table(&self) -> Result<TrainingTable, DatasetError> {
        let table = match &self.input {
            CsvInput::File(path) => {
                tracing::debug!(path = %path.display(), "Loading training dataset");
                let content = std::fs::read_to_string(path)?;
                Self::parse(&content)?
            }
            CsvInput::Text(text) => Self::parse(text)?,
        };

        tracing::info!(rows = table.num_rows(), "Loaded training dataset");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_markers() {
        let csv = "Age,Sleep_Hours,Treatment\n29,,NA\n41,7.5,Therapy\n";
        let table = CsvDataset::from_text(csv).load_table().unwrap();

        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("Sleep_Hours").unwrap()[0], None);
        assert_eq!(table.column("Treatment").unwrap()[0], None);
        assert_eq!(
            table.column("Treatment").unwrap()[1].as_deref(),
            Some("Therapy")
        );
    }

    #[test]
    fn test_header_whitespace_trimmed() {
        let table = CsvDataset::from_text(" Age , Gender\n30, Male\n")
            .load_table()
            .unwrap();
        assert_eq!(table.column("Gender").unwrap()[0].as_deref(), Some("Male"));
    }

    #[test]
    fn test_repeated_column_is_parse_error() {
        let csv = "Age,Gender,Age\n30,Female,99\n41,Male,88\n";
        let err = CsvDataset::from_text(csv).load_table().unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let err = CsvDataset::from_text("A,B\n1,2,3\n").load_table().unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CsvDataset::from_path("/nonexistent/mindscope.csv")
            .load_table()
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
