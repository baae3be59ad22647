//! FILENAME: core/chart-support/src/prepare.rs
//! PURPOSE: Load-to-chart-ready pipeline for one dataset.
//! CONTEXT: Steps run in a fixed order: load, drop duplicate rows, handle
//! missing values, set the time index, select columns, coerce numeric text,
//! filter the date range, resample, trim the running period. Each step past
//! the missing value policy is optional.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use table::{Column, Table, Value};

use crate::error::ChartError;
use crate::loader::{LoaderConfig, TableLoader};
use crate::period::{PeriodHint, PeriodTrimmer};
use crate::resample::{label_quarters, resample, Frequency, Resample};
use crate::time_index::TimeIndexer;

/// What to do with empty cells after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingPolicy {
    Keep,
    /// Drop every row with an empty cell.
    DropRows,
    /// Drop every column with an empty cell.
    DropColumns,
    FillZero,
    /// Carry the last value down each column. Leading gaps stay empty.
    ForwardFill,
    /// Fail with [`ChartError::MissingValues`].
    Reject,
}

impl Default for MissingPolicy {
    fn default() -> Self {
        MissingPolicy::Reject
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    /// Resolved against `loader.data_dir`.
    pub file: String,
    pub loader: LoaderConfig,
    /// Index the table by time. When false only the steps up to column
    /// selection run.
    pub time_index: bool,
    /// Extra time column name to recognise.
    pub time_column: Option<String>,
    pub drop_duplicates: bool,
    pub missing: MissingPolicy,
    /// `None` keeps every column.
    pub columns: Option<Vec<String>>,
    pub coerce_numeric: bool,
    /// Inclusive bounds.
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub resample: Option<Resample>,
    pub trim_current_period: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        PrepareOptions {
            file: String::new(),
            loader: LoaderConfig::default(),
            time_index: true,
            time_column: None,
            drop_duplicates: true,
            missing: MissingPolicy::default(),
            columns: None,
            coerce_numeric: false,
            start: None,
            end: None,
            resample: None,
            trim_current_period: true,
        }
    }
}

/// Result of [`prepare`].
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub table: Table,
    /// Reporting period detected by the time indexer.
    pub period: PeriodHint,
}

pub fn prepare<L, I, T>(
    loader: &L,
    indexer: &I,
    trimmer: &T,
    options: &PrepareOptions,
) -> Result<Prepared, ChartError>
where
    L: TableLoader + ?Sized,
    I: TimeIndexer + ?Sized,
    T: PeriodTrimmer + ?Sized,
{
    let path = options.loader.resolve(&options.file);
    let mut table = loader.load(&path)?;

    if options.drop_duplicates {
        let before = table.row_count();
        table = table.dedup_values();
        log::debug!(target: "PREPARE", "dropped {} duplicate rows", before - table.row_count());
    }

    table = apply_missing_policy(&table, options.missing)?;

    if !options.time_index {
        let table = finish_columns(&table, options)?;
        return Ok(Prepared {
            table,
            period: PeriodHint::default(),
        });
    }

    let (indexed, period) = indexer.apply(&table, options.time_column.as_deref())?;
    table = finish_columns(&indexed, options)?;

    if options.start.is_some() || options.end.is_some() {
        table = filter_date_range(&table, options.start, options.end)?;
    }

    if let Some(spec) = &options.resample {
        table = resample(&table, spec)?;
    }

    if options.trim_current_period {
        table = trimmer.trim(&table, period)?;
    }

    // Quarter labels are text, so they go on after every time-based step
    if matches!(options.resample, Some(Resample { frequency: Frequency::Quarter, .. })) {
        table = label_quarters(&table)?;
    }

    log::debug!(
        target: "PREPARE",
        "{} ready: {} rows, columns {:?}",
        path.display(),
        table.row_count(),
        table.column_names()
    );
    Ok(Prepared { table, period })
}

fn finish_columns(table: &Table, options: &PrepareOptions) -> Result<Table, ChartError> {
    let selected = match &options.columns {
        Some(names) => table.select_columns(names)?,
        None => table.clone(),
    };
    Ok(if options.coerce_numeric {
        selected.coerce_numeric_text()
    } else {
        selected
    })
}

/// Applies `policy` to a table that may contain empty cells.
pub fn apply_missing_policy(table: &Table, policy: MissingPolicy) -> Result<Table, ChartError> {
    let missing: usize = table
        .columns()
        .iter()
        .map(|c| c.values.iter().filter(|v| v.is_empty()).count())
        .sum();
    if missing == 0 {
        return Ok(table.clone());
    }

    log::debug!(target: "PREPARE", "{} missing values, policy {:?}", missing, policy);

    let result = match policy {
        MissingPolicy::Keep => table.clone(),
        MissingPolicy::DropRows => {
            table.filter_rows(|row| table.columns().iter().all(|c| !c.values[row].is_empty()))
        }
        MissingPolicy::DropColumns => {
            let complete = table
                .columns()
                .iter()
                .filter(|c| !c.values.iter().any(Value::is_empty))
                .cloned()
                .collect();
            table.with_columns(complete)?
        }
        MissingPolicy::FillZero => table.map_values(|v| match v {
            Value::Empty => Value::Number(0.0),
            other => other.clone(),
        }),
        MissingPolicy::ForwardFill => {
            let filled = table.columns().iter().map(forward_fill).collect();
            table.with_columns(filled)?
        }
        MissingPolicy::Reject => return Err(ChartError::MissingValues(missing)),
    };
    Ok(result)
}

fn forward_fill(column: &Column) -> Column {
    let mut last = Value::Empty;
    let values = column
        .values
        .iter()
        .map(|value| {
            if !value.is_empty() {
                last = value.clone();
            }
            last.clone()
        })
        .collect();
    Column::new(column.name.clone(), values)
}

/// Keeps rows with `start <= time <= end`.
pub fn filter_date_range(
    table: &Table,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Table, ChartError> {
    let times = table
        .index()
        .iter()
        .map(|label| label.as_time())
        .collect::<Option<Vec<_>>>()
        .ok_or(ChartError::NotTimeIndexed)?;

    Ok(table.filter_rows(|row| {
        start.map_or(true, |s| times[row] >= s) && end.map_or(true, |e| times[row] <= e)
    }))
}
