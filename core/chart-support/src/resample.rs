//! FILENAME: core/chart-support/src/resample.rs
//! Calendar resampling of a time-indexed table.
//!
//! Rows are bucketed by the period they fall in and each bucket is labeled
//! with the last day of its period. Only buckets that contain rows are
//! emitted.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use table::{Column, IndexLabel, Table, Value};

use crate::error::ChartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// How the rows of one bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Sum of the non-empty cells, 0 when there are none.
    Sum,
    /// Last non-empty cell.
    Last,
}

impl Default for Aggregation {
    fn default() -> Self {
        Aggregation::Sum
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resample {
    pub frequency: Frequency,
    #[serde(default)]
    pub aggregation: Aggregation,
}

/// Last day of the period containing `date`. Weeks end on Sunday.
pub fn bucket_end(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Day => date,
        Frequency::Week => date + Days::new(u64::from(6 - date.weekday().num_days_from_monday())),
        Frequency::Month => last_day_of_month(date.year(), date.month()).unwrap_or(date),
        Frequency::Quarter => {
            let last_month = (date.month0() / 3) * 3 + 3;
            last_day_of_month(date.year(), last_month).unwrap_or(date)
        }
        Frequency::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Quarter label such as `"Q1 24"`.
pub fn quarter_label(date: NaiveDate) -> String {
    format!("Q{} {:02}", date.month0() / 3 + 1, date.year().rem_euclid(100))
}

/// Aggregates a time-indexed table into calendar buckets.
pub fn resample(table: &Table, spec: &Resample) -> Result<Table, ChartError> {
    let order = table.index_order();

    let mut buckets: Vec<(NaiveDate, Vec<usize>)> = Vec::new();
    for row in order {
        let time = table.index()[row].as_time().ok_or(ChartError::NotTimeIndexed)?;
        let end = bucket_end(time.date(), spec.frequency);
        match buckets.last_mut() {
            Some((last, rows)) if *last == end => rows.push(row),
            _ => buckets.push((end, vec![row])),
        }
    }

    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let values = match spec.aggregation {
                Aggregation::Sum => {
                    let numbers = table.numbers(&column.name)?;
                    buckets
                        .iter()
                        .map(|(_, rows)| Value::Number(rows.iter().filter_map(|&r| numbers[r]).sum()))
                        .collect()
                }
                Aggregation::Last => buckets
                    .iter()
                    .map(|(_, rows)| {
                        rows.iter()
                            .rev()
                            .map(|&r| &column.values[r])
                            .find(|v| !v.is_empty())
                            .cloned()
                            .unwrap_or(Value::Empty)
                    })
                    .collect(),
            };
            Ok(Column::new(column.name.clone(), values))
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    let index = buckets
        .iter()
        .map(|(end, _)| IndexLabel::Time(end.and_time(NaiveTime::MIN)))
        .collect();

    log::debug!(
        target: "PREPARE",
        "resampled {} rows into {} {:?} buckets ({:?})",
        table.row_count(),
        buckets.len(),
        spec.frequency,
        spec.aggregation
    );

    Ok(Table::new(index, columns)?.with_index_name(table.index_name().unwrap_or("date")))
}

/// Replaces a time index with quarter labels.
pub fn label_quarters(table: &Table) -> Result<Table, ChartError> {
    let index = table
        .index()
        .iter()
        .map(|label| {
            label
                .as_time()
                .map(|t| IndexLabel::Key(quarter_label(t.date())))
                .ok_or(ChartError::NotTimeIndexed)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(table.with_index(index, table.index_name().map(str::to_string))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate) -> IndexLabel {
        IndexLabel::Time(d.and_time(NaiveTime::MIN))
    }

    #[test]
    fn test_bucket_end() {
        let d = date(2024, 2, 14);
        assert_eq!(bucket_end(d, Frequency::Day), d);
        assert_eq!(bucket_end(d, Frequency::Week), date(2024, 2, 18));
        assert_eq!(bucket_end(d, Frequency::Month), date(2024, 2, 29));
        assert_eq!(bucket_end(d, Frequency::Quarter), date(2024, 3, 31));
        assert_eq!(bucket_end(date(2024, 11, 2), Frequency::Quarter), date(2024, 12, 31));
        assert_eq!(bucket_end(d, Frequency::Year), date(2024, 12, 31));
    }

    #[test]
    fn test_quarter_label() {
        assert_eq!(quarter_label(date(2024, 3, 31)), "Q1 24");
        assert_eq!(quarter_label(date(2009, 12, 31)), "Q4 09");
    }

    #[test]
    fn test_resample_sum_and_last() {
        let table = Table::new(
            vec![at(date(2024, 2, 1)), at(date(2024, 1, 15)), at(date(2024, 1, 31))],
            vec![
                Column::numeric("fees", [5.0, 1.0, 2.0]),
                Column::new("tvl", vec![Value::Number(9.0), Value::Number(7.0), Value::Empty]),
            ],
        )
        .unwrap()
        .with_index_name("date");

        let monthly = Resample { frequency: Frequency::Month, aggregation: Aggregation::Sum };
        let summed = resample(&table, &monthly).unwrap();
        assert_eq!(summed.index(), &[at(date(2024, 1, 31)), at(date(2024, 2, 29))]);
        assert_eq!(summed.numbers("fees").unwrap(), vec![Some(3.0), Some(5.0)]);
        assert_eq!(summed.index_name(), Some("date"));

        let last = resample(&table, &Resample { aggregation: Aggregation::Last, ..monthly }).unwrap();
        assert_eq!(last.numbers("tvl").unwrap(), vec![Some(7.0), Some(9.0)]);
    }

    #[test]
    fn test_resample_sum_rejects_text() {
        let table = Table::new(vec![at(date(2024, 1, 1))], vec![Column::text("app", ["x"])]).unwrap();
        let spec = Resample { frequency: Frequency::Week, aggregation: Aggregation::Sum };
        assert!(matches!(resample(&table, &spec), Err(ChartError::Table(_))));
    }

    #[test]
    fn test_label_quarters() {
        let table = Table::new(vec![at(date(2024, 6, 30))], vec![Column::numeric("v", [1.0])]).unwrap();
        let labeled = label_quarters(&table).unwrap();
        assert_eq!(labeled.index(), &[IndexLabel::Key("Q2 24".to_string())]);
    }
}
