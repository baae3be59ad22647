//! FILENAME: core/table/src/table.rs
//! PURPOSE: The column-oriented table every transform reads and produces.
//! CONTEXT: Tables are value objects. Every method taking `&self` returns a
//! fresh table; only `push_row` mutates, and it is meant for tables a caller
//! is still building.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::value::{IndexLabel, Value, ValueKey};

// ============================================================================
// COLUMN
// ============================================================================

/// A named sequence of values aligned with the table index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Column::new(name, values.into_iter().map(Value::Number).collect())
    }

    pub fn text<S: AsRef<str>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Column::new(
            name,
            values
                .into_iter()
                .map(|s| Value::Text(s.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// An ordered collection of equally long named columns sharing one row index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    index_name: Option<String>,
    index: Vec<IndexLabel>,
    columns: Vec<Column>,
}

/// Wire shape of a table. Deserialized tables go through `Table::new`.
#[derive(Deserialize)]
struct RawTable {
    #[serde(default)]
    index_name: Option<String>,
    index: Vec<IndexLabel>,
    columns: Vec<Column>,
}

impl TryFrom<RawTable> for Table {
    type Error = TableError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        let mut table = Table::new(raw.index, raw.columns)?;
        table.index_name = raw.index_name;
        Ok(table)
    }
}

impl Table {
    /// Builds a table, checking column lengths and name uniqueness.
    pub fn new(index: Vec<IndexLabel>, columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen = FxHashSet::default();
        for column in &columns {
            if column.len() != index.len() {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: index.len(),
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Table {
            index_name: None,
            index,
            columns,
        })
    }

    /// Builds a table with a positional `Row` index.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map_or(0, Column::len);
        Table::new((0..rows).map(IndexLabel::Row).collect(), columns)
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn index(&self) -> &[IndexLabel] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_position(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        let pos = self.column_position(name)?;
        Ok(&self.columns[pos])
    }

    pub fn cell(&self, row: usize, name: &str) -> Result<&Value, TableError> {
        let column = self.column(name)?;
        column.values.get(row).ok_or(TableError::OutOfRange {
            index: row,
            len: self.row_count(),
        })
    }

    /// Returns one row's cells in column order.
    pub fn row(&self, row: usize) -> Result<Vec<&Value>, TableError> {
        if row >= self.row_count() {
            return Err(TableError::OutOfRange {
                index: row,
                len: self.row_count(),
            });
        }
        Ok(self.columns.iter().map(|c| &c.values[row]).collect())
    }

    /// Reads a column as numbers. `Empty` cells map to `None`; text or time
    /// cells are an error.
    pub fn numbers(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        let column = self.column(name)?;
        column
            .values
            .iter()
            .enumerate()
            .map(|(row, value)| match value {
                Value::Empty => Ok(None),
                Value::Number(n) => Ok(Some(*n)),
                _ => Err(TableError::NotNumeric {
                    column: name.to_string(),
                    row,
                }),
            })
            .collect()
    }

    /// Reads a column as entity labels.
    pub fn labels(&self, name: &str) -> Result<Vec<String>, TableError> {
        Ok(self.column(name)?.values.iter().map(Value::label).collect())
    }

    pub fn has_missing(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.values.iter().any(Value::is_empty))
    }

    /// Row positions ordered by index label. The sort is stable, so rows that
    /// share a label keep their relative order.
    pub fn index_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.row_count()).collect();
        order.sort_by(|&a, &b| self.index[a].cmp(&self.index[b]));
        order
    }

    /// Copies the given rows, in the given order, into a new table.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            index_name: self.index_name.clone(),
            index: rows.iter().map(|&r| self.index[r].clone()).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), rows.iter().map(|&r| c.values[r].clone()).collect()))
                .collect(),
        }
    }

    pub fn filter_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Table {
        let rows: Vec<usize> = (0..self.row_count()).filter(|&r| keep(r)).collect();
        self.take_rows(&rows)
    }

    pub fn sorted_by_index(&self) -> Table {
        self.take_rows(&self.index_order())
    }

    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let columns = names
            .iter()
            .map(|name| self.column(name.as_ref()).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        self.with_columns(columns)
    }

    pub fn without_column(&self, name: &str) -> Result<Table, TableError> {
        let pos = self.column_position(name)?;
        let mut columns = self.columns.clone();
        columns.remove(pos);
        self.with_columns(columns)
    }

    /// Builds a table over this table's index from a new set of columns.
    pub fn with_columns(&self, columns: Vec<Column>) -> Result<Table, TableError> {
        let mut table = Table::new(self.index.clone(), columns)?;
        table.index_name = self.index_name.clone();
        Ok(table)
    }

    /// Replaces the row index.
    pub fn with_index(&self, index: Vec<IndexLabel>, name: Option<String>) -> Result<Table, TableError> {
        let mut table = Table::new(index, self.columns.clone())?;
        table.index_name = name;
        Ok(table)
    }

    /// Returns a copy where one column's values are swapped for `values`.
    pub fn replace_values(&self, name: &str, values: Vec<Value>) -> Result<Table, TableError> {
        let pos = self.column_position(name)?;
        let mut columns = self.columns.clone();
        columns[pos].values = values;
        self.with_columns(columns)
    }

    pub fn rename_columns(&self, mut rename: impl FnMut(&str) -> String) -> Result<Table, TableError> {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(rename(&c.name), c.values.clone()))
            .collect();
        self.with_columns(columns)
    }

    pub fn map_values(&self, mut f: impl FnMut(&Value) -> Value) -> Table {
        Table {
            index_name: self.index_name.clone(),
            index: self.index.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values.iter().map(&mut f).collect()))
                .collect(),
        }
    }

    /// Converts numeric-looking text cells (`"$1,200"`, `"35%"`) to numbers.
    pub fn coerce_numeric_text(&self) -> Table {
        self.map_values(Value::coerce_numeric)
    }

    /// Appends one row. `values` must hold one cell per column.
    pub fn push_row(&mut self, label: IndexLabel, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.index.push(label);
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.values.push(value);
        }
        Ok(())
    }

    /// Drops rows whose index label and every cell repeat an earlier row.
    pub fn dedup_rows(&self) -> Table {
        let mut seen: FxHashSet<(IndexLabel, Vec<ValueKey>)> = FxHashSet::default();
        self.filter_rows(|row| {
            let key = (
                self.index[row].clone(),
                self.columns.iter().map(|c| c.values[row].key()).collect(),
            );
            seen.insert(key)
        })
    }

    /// Drops rows whose cells repeat an earlier row, whatever their index.
    pub fn dedup_values(&self) -> Table {
        let mut seen: FxHashSet<Vec<ValueKey>> = FxHashSet::default();
        self.filter_rows(|row| seen.insert(self.columns.iter().map(|c| c.values[row].key()).collect()))
    }
}
