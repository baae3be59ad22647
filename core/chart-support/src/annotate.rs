//! FILENAME: core/chart-support/src/annotate.rs
//! The "latest value" annotation shown next to a time series.

use serde::{Deserialize, Serialize};
use table::Table;
use value_format::format_count;

use crate::error::ChartError;

pub const DATE_FORMAT: &str = "%m-%d-%Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestValue {
    /// Whole number with thousands separators.
    pub value: String,
    pub date: String,
}

/// Formats the last row of `column`. The table is expected to be sorted by
/// time; `None` when it has no rows.
pub fn latest_value(table: &Table, column: &str) -> Result<Option<LatestValue>, ChartError> {
    let numbers = table.numbers(column)?;
    let Some(last) = numbers.len().checked_sub(1) else {
        return Ok(None);
    };

    let time = table.index()[last].as_time().ok_or(ChartError::NotTimeIndexed)?;
    let value = format_count(numbers[last].unwrap_or(f64::NAN));

    Ok(Some(LatestValue {
        value,
        date: time.format(DATE_FORMAT).to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use table::{Column, IndexLabel, Value};

    fn series(values: Vec<Value>) -> Table {
        let index = (0..values.len())
            .map(|i| {
                let day = NaiveDate::from_ymd_opt(2024, 7, 1 + i as u32).unwrap();
                IndexLabel::Time(day.and_hms_opt(0, 0, 0).unwrap())
            })
            .collect();
        Table::new(index, vec![Column::new("users", values)]).unwrap()
    }

    #[test]
    fn test_latest_value() {
        let table = series(vec![Value::Number(10.0), Value::Number(1_234_567.6)]);
        assert_eq!(
            latest_value(&table, "users").unwrap(),
            Some(LatestValue {
                value: "1,234,568".to_string(),
                date: "07-02-2024".to_string(),
            })
        );
    }

    #[test]
    fn test_latest_value_edges() {
        assert_eq!(latest_value(&series(vec![]), "users").unwrap(), None);
        assert_eq!(latest_value(&series(vec![Value::Empty]), "users").unwrap().unwrap().value, "n/a");

        let positional = Table::from_columns(vec![Column::numeric("users", [1.0])]).unwrap();
        assert_eq!(latest_value(&positional, "users").unwrap_err(), ChartError::NotTimeIndexed);
    }
}
