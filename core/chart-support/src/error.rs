//! FILENAME: core/chart-support/src/error.rs

use std::path::PathBuf;
use table::TableError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("File is empty: {0}")]
    Empty(PathBuf),

    #[error("Invalid encoding in {0}")]
    Encoding(PathBuf),

    #[error("Error loading {path}: {message}")]
    Other { path: PathBuf, message: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Renderer failed: {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("{0} missing values need a missing value policy")]
    MissingValues(usize),

    #[error("Cannot read '{text}' in column '{column}' (row {row}) as a time")]
    UnparsableTime {
        column: String,
        row: usize,
        text: String,
    },

    #[error("Table has no time index")]
    NotTimeIndexed,
}
