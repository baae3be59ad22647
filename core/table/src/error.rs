//! FILENAME: core/table/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column '{column}' has {actual} values but the index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row has {actual} values but the table has {expected} columns")]
    RowWidth { expected: usize, actual: usize },

    #[error("Index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("Column '{column}' holds a non-numeric value at row {row}")]
    NotNumeric { column: String, row: usize },
}
