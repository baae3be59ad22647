//! FILENAME: core/chart-support/src/time_index.rs
//! PURPOSE: Promotes a recognised time column to the table index.
//! CONTEXT: Exported datasets name their time column in many ways ("date",
//! "block_time", "date(utc)"...). The first column with a known name becomes
//! the index; a `week`, `month` or `quarter` column also tells the trimmer
//! which period the rows are reported in.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use table::{IndexLabel, Table, Value};

use crate::error::ChartError;
use crate::period::PeriodHint;

/// Column names recognised as time columns, compared case-insensitively.
pub const TIME_COLUMNS: [&str; 18] = [
    "date",
    "dt",
    "hour",
    "time",
    "day",
    "month",
    "year",
    "week",
    "timestamp",
    "date(utc)",
    "block_timestamp",
    "ds",
    "period",
    "date_time",
    "trunc_date",
    "quarter",
    "block_time",
    "block_date",
];

/// Holds epoch milliseconds rather than formatted text.
const EPOCH_MILLIS_COLUMN: &str = "timestamp";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const MONTH_FIRST_DATETIME: [&str; 2] = ["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];
const MONTH_FIRST_DATE: [&str; 2] = ["%m/%d/%Y", "%m-%d-%Y"];
const DAY_FIRST_DATETIME: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];
const DAY_FIRST_DATE: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

pub trait TimeIndexer {
    /// Returns the re-indexed table and the period its rows are reported in.
    ///
    /// `time_column` names an extra column to recognise besides the
    /// built-in list.
    fn apply(&self, table: &Table, time_column: Option<&str>) -> Result<(Table, PeriodHint), ChartError>;
}

/// Finds the time column by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNameIndexer {
    /// Read ambiguous dates as `d/m/Y` instead of `m/d/Y`.
    pub dayfirst: bool,
    /// Parse the time column; when false its labels are used verbatim.
    pub convert: bool,
    /// Set the period hint from a `week`, `month` or `quarter` column.
    pub detect_period: bool,
}

impl Default for ColumnNameIndexer {
    fn default() -> Self {
        ColumnNameIndexer {
            dayfirst: false,
            convert: true,
            detect_period: true,
        }
    }
}

impl TimeIndexer for ColumnNameIndexer {
    fn apply(&self, table: &Table, time_column: Option<&str>) -> Result<(Table, PeriodHint), ChartError> {
        let hint = if self.detect_period {
            table
                .column_names()
                .into_iter()
                .find_map(PeriodHint::from_column_name)
                .unwrap_or_default()
        } else {
            PeriodHint::default()
        };

        let custom = time_column.map(str::to_lowercase);
        let found = table.columns().iter().find(|c| {
            let lower = c.name.to_lowercase();
            TIME_COLUMNS.contains(&lower.as_str()) || custom.as_deref() == Some(lower.as_str())
        });

        let Some(column) = found else {
            log::warn!(target: "PREPARE", "no time column among {:?}", table.column_names());
            return Ok((table.clone(), hint));
        };

        let epoch_millis = column.name.to_lowercase() == EPOCH_MILLIS_COLUMN;
        let index = column
            .values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let time = if epoch_millis {
                    from_epoch_millis(value)
                } else if self.convert {
                    to_time(value, self.dayfirst)
                } else {
                    return Ok(match value {
                        Value::Time(t) => IndexLabel::Time(*t),
                        other => IndexLabel::Key(other.label()),
                    });
                };
                time.map(IndexLabel::Time).ok_or_else(|| ChartError::UnparsableTime {
                    column: column.name.clone(),
                    row,
                    text: value.label(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let indexed = table
            .without_column(&column.name)?
            .with_index(index, Some(column.name.clone()))?
            .sorted_by_index();

        log::debug!(
            target: "PREPARE",
            "indexed by '{}' ({:?}, {} rows)",
            column.name,
            hint,
            indexed.row_count()
        );
        Ok((indexed, hint))
    }
}

fn to_time(value: &Value, dayfirst: bool) -> Option<NaiveDateTime> {
    match value {
        Value::Time(t) => Some(*t),
        Value::Text(text) => parse_time(text, dayfirst),
        // A bare year such as 2024
        Value::Number(n) if n.fract() == 0.0 && (1000.0..=9999.0).contains(n) => {
            NaiveDate::from_ymd_opt(*n as i32, 1, 1).map(|d| d.and_time(NaiveTime::MIN))
        }
        _ => None,
    }
}

fn from_epoch_millis(value: &Value) -> Option<NaiveDateTime> {
    let millis = match value {
        Value::Time(t) => return Some(*t),
        Value::Number(n) => *n,
        Value::Text(text) => text.trim().parse::<f64>().ok()?,
        Value::Empty => return None,
    };
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|t| t.naive_utc())
}

/// Parses the date and date-time spellings found in exported datasets.
///
/// Offsets are dropped, keeping the wall-clock time. `dayfirst` picks the
/// preferred reading of `01/02/2024`; the other reading is still tried when
/// the preferred one is impossible.
pub fn parse_time(text: &str, dayfirst: bool) -> Option<NaiveDateTime> {
    let text = text.trim();
    let text = text.strip_suffix(" UTC").unwrap_or(text);

    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.naive_local());
    }

    let (preferred, fallback) = if dayfirst {
        ((&DAY_FIRST_DATETIME[..], &DAY_FIRST_DATE[..]), (&MONTH_FIRST_DATETIME[..], &MONTH_FIRST_DATE[..]))
    } else {
        ((&MONTH_FIRST_DATETIME[..], &MONTH_FIRST_DATE[..]), (&DAY_FIRST_DATETIME[..], &DAY_FIRST_DATE[..]))
    };

    let datetime_formats = DATETIME_FORMATS.iter().chain(preferred.0).chain(fallback.0);
    for format in datetime_formats {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
            return Some(t);
        }
    }

    let date_formats = DATE_FORMATS.iter().chain(preferred.1).chain(fallback.1);
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    // "2024-03" and "2024"
    NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01-01", text), "%Y-%m-%d"))
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use table::Column;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_time_spellings() {
        assert_eq!(parse_time("2024-03-05", false), Some(at(2024, 3, 5, 0)));
        assert_eq!(parse_time("2024-03-05 14:00:00.000 UTC", false), Some(at(2024, 3, 5, 14)));
        assert_eq!(parse_time("2024-03-05T14:00:00+02:00", false), Some(at(2024, 3, 5, 14)));
        assert_eq!(parse_time("2024-03", false), Some(at(2024, 3, 1, 0)));
        assert_eq!(parse_time("2024", false), Some(at(2024, 1, 1, 0)));
        assert_eq!(parse_time("yesterday", false), None);
    }

    #[test]
    fn test_parse_time_dayfirst() {
        assert_eq!(parse_time("03/05/2024", false), Some(at(2024, 3, 5, 0)));
        assert_eq!(parse_time("03/05/2024", true), Some(at(2024, 5, 3, 0)));
        // Only one reading is a valid date
        assert_eq!(parse_time("25/05/2024", false), Some(at(2024, 5, 25, 0)));
    }

    #[test]
    fn test_apply_sets_index_and_sorts() {
        let table = Table::from_columns(vec![
            Column::text("Date", ["2024-01-02", "2024-01-01"]),
            Column::numeric("fees", [2.0, 1.0]),
        ])
        .unwrap();

        let (indexed, hint) = ColumnNameIndexer::default().apply(&table, None).unwrap();
        assert_eq!(hint, PeriodHint::Day);
        assert_eq!(indexed.index_name(), Some("Date"));
        assert_eq!(indexed.column_names(), vec!["fees"]);
        assert_eq!(indexed.index()[0], IndexLabel::Time(at(2024, 1, 1, 0)));
        assert_eq!(indexed.numbers("fees").unwrap(), vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_apply_detects_period_and_custom_column() {
        let table = Table::from_columns(vec![
            Column::text("Week", ["2024-01-08"]),
            Column::numeric("v", [1.0]),
        ])
        .unwrap();
        let (_, hint) = ColumnNameIndexer::default().apply(&table, None).unwrap();
        assert_eq!(hint, PeriodHint::Week);

        let table = Table::from_columns(vec![
            Column::numeric("v", [1.0]),
            Column::text("settled_on", ["2024-01-08"]),
        ])
        .unwrap();
        let (indexed, _) = ColumnNameIndexer::default().apply(&table, Some("Settled_On")).unwrap();
        assert_eq!(indexed.index_name(), Some("settled_on"));
    }

    #[test]
    fn test_apply_epoch_millis() {
        let table = Table::from_columns(vec![Column::numeric("timestamp", [1_704_067_200_000.0])]).unwrap();
        let (indexed, _) = ColumnNameIndexer::default().apply(&table, None).unwrap();
        assert_eq!(indexed.index(), &[IndexLabel::Time(at(2024, 1, 1, 0))]);
    }

    #[test]
    fn test_apply_without_conversion_keeps_labels() {
        let table = Table::from_columns(vec![Column::text("period", ["Q1 24"])]).unwrap();
        let indexer = ColumnNameIndexer { convert: false, ..ColumnNameIndexer::default() };
        let (indexed, _) = indexer.apply(&table, None).unwrap();
        assert_eq!(indexed.index(), &[IndexLabel::Key("Q1 24".to_string())]);
    }

    #[test]
    fn test_apply_reports_bad_cells() {
        let table = Table::from_columns(vec![Column::text("date", ["2024-01-01", "soon"])]).unwrap();
        assert_eq!(
            ColumnNameIndexer::default().apply(&table, None).unwrap_err(),
            ChartError::UnparsableTime {
                column: "date".to_string(),
                row: 1,
                text: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_apply_without_time_column_is_unchanged() {
        let table = Table::from_columns(vec![Column::numeric("fees", [1.0])]).unwrap();
        let (same, hint) = ColumnNameIndexer::default().apply(&table, None).unwrap();
        assert_eq!(same, table);
        assert_eq!(hint, PeriodHint::Day);
    }
}
