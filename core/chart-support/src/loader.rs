//! FILENAME: core/chart-support/src/loader.rs
//! Table sources. Parsing files is left to implementors of [`TableLoader`];
//! [`MemoryLoader`] serves tables that are already in memory.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use table::Table;

use crate::error::LoadError;

pub trait TableLoader {
    fn load(&self, path: &Path) -> Result<Table, LoadError>;
}

/// Where relative file names are looked up and how delimited text is split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub data_dir: PathBuf,
    /// Field delimiter for delimited-text loaders.
    pub delimiter: char,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            data_dir: PathBuf::from("data"),
            delimiter: ',',
        }
    }
}

impl LoaderConfig {
    /// Resolves `file` against `data_dir`. Absolute paths are returned as is.
    pub fn resolve(&self, file: impl AsRef<Path>) -> PathBuf {
        self.data_dir.join(file)
    }
}

/// Tables keyed by the path they are served under.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    tables: FxHashMap<PathBuf, Table>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `table` under `path`, returning the table it replaced.
    pub fn insert(&mut self, path: impl Into<PathBuf>, table: Table) -> Option<Table> {
        self.tables.insert(path.into(), table)
    }

    pub fn with_table(mut self, path: impl Into<PathBuf>, table: Table) -> Self {
        self.insert(path, table);
        self
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<Table, LoadError> {
        let table = self
            .tables
            .get(path)
            .ok_or_else(|| LoadError::NotFound(path.to_path_buf()))?;

        if table.columns().is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }

        log::debug!(
            target: "PREPARE",
            "loaded {} ({} rows, {} columns)",
            path.display(),
            table.row_count(),
            table.columns().len()
        );
        Ok(table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table::Column;

    #[test]
    fn test_resolve() {
        let config = LoaderConfig::default();
        assert_eq!(config.resolve("fees.csv"), PathBuf::from("data/fees.csv"));

        let config: LoaderConfig = serde_json::from_str(r#"{ "data_dir": "/srv/charts" }"#).unwrap();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.resolve("fees.csv"), PathBuf::from("/srv/charts/fees.csv"));
        assert_eq!(config.resolve("/tmp/x.csv"), PathBuf::from("/tmp/x.csv"));
    }

    #[test]
    fn test_memory_loader() {
        let table = Table::from_columns(vec![Column::numeric("fees", [1.0, 2.0])]).unwrap();
        let loader = MemoryLoader::new()
            .with_table("data/fees.csv", table.clone())
            .with_table("data/blank.csv", Table::default());

        assert_eq!(loader.len(), 2);
        assert_eq!(loader.load(Path::new("data/fees.csv")).unwrap(), table);
        assert_eq!(
            loader.load(Path::new("data/missing.csv")).unwrap_err(),
            LoadError::NotFound(PathBuf::from("data/missing.csv"))
        );
        assert_eq!(
            loader.load(Path::new("data/blank.csv")).unwrap_err(),
            LoadError::Empty(PathBuf::from("data/blank.csv"))
        );
    }
}
