//! FILENAME: core/chart-support/src/period.rs
//! PURPOSE: Reporting periods and the removal of the period still in progress.
//! CONTEXT: A chart of weekly totals should not end on a half-finished week.
//! The trimmer drops every row at or after the start of the current period,
//! where "current" is relative to an explicit `today`.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use table::Table;

use crate::error::ChartError;

/// Granularity of the time index, detected from column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodHint {
    Day,
    Week,
    Month,
    Quarter,
}

impl Default for PeriodHint {
    fn default() -> Self {
        PeriodHint::Day
    }
}

impl PeriodHint {
    /// Maps a column name (`week`, `Month`, ...) to its period.
    pub fn from_column_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "week" => Some(PeriodHint::Week),
            "month" => Some(PeriodHint::Month),
            "quarter" => Some(PeriodHint::Quarter),
            _ => None,
        }
    }
}

/// First day of the period containing `date`. Weeks start on Monday.
pub fn period_start(date: NaiveDate, hint: PeriodHint) -> NaiveDate {
    match hint {
        PeriodHint::Day => date,
        PeriodHint::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
        PeriodHint::Month => date.with_day(1).unwrap_or(date),
        PeriodHint::Quarter => {
            let first_month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap_or(date)
        }
    }
}

pub trait PeriodTrimmer {
    /// Removes rows belonging to an incomplete period and sorts by time.
    fn trim(&self, table: &Table, hint: PeriodHint) -> Result<Table, ChartError>;
}

/// Trims against a fixed calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarTrimmer {
    pub today: NaiveDate,
}

impl CalendarTrimmer {
    pub fn new(today: NaiveDate) -> Self {
        CalendarTrimmer { today }
    }
}

impl PeriodTrimmer for CalendarTrimmer {
    fn trim(&self, table: &Table, hint: PeriodHint) -> Result<Table, ChartError> {
        let times = table
            .index()
            .iter()
            .map(|label| label.as_time())
            .collect::<Option<Vec<_>>>()
            .ok_or(ChartError::NotTimeIndexed)?;

        // Days never keep today, longer periods drop the running one
        let cutoff = period_start(self.today, hint).and_time(NaiveTime::MIN);
        let trimmed = table.filter_rows(|row| times[row] < cutoff).sorted_by_index();

        log::debug!(
            target: "PREPARE",
            "trimmed {} rows at or after {} ({:?})",
            table.row_count() - trimmed.row_count(),
            cutoff,
            hint
        );
        Ok(trimmed)
    }
}
