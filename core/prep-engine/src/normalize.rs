//! FILENAME: core/prep-engine/src/normalize.rs
//! Normalizer - Expresses magnitudes as percentages of a total.
//!
//! A zero total has no meaningful share. `ZeroTotal::Zero` reports 0% for
//! every cell of that row or group, `ZeroTotal::Undefined` reports NaN.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use table::{Column, IndexLabel, Table, TableError, Value};

use crate::definition::{Direction, NormalizeSpec, ZeroTotal};
use crate::rank::{compare_scores, sum_by_category};

/// Wide table: every cell as a percentage of its row total.
///
/// Empty cells are left empty and do not contribute to the total.
pub fn percent_of_row_total(table: &Table, zero_total: ZeroTotal) -> Result<Table, TableError> {
    let numbers = table
        .columns()
        .iter()
        .map(|c| table.numbers(&c.name))
        .collect::<Result<Vec<_>, _>>()?;

    let totals: Vec<f64> = (0..table.row_count())
        .map(|row| numbers.iter().filter_map(|column| column[row]).sum())
        .collect();

    let columns = table
        .columns()
        .iter()
        .zip(&numbers)
        .map(|(column, values)| {
            let percents = values
                .iter()
                .zip(&totals)
                .map(|(value, total)| match value {
                    Some(v) => Value::Number(percent_of(*v, *total, zero_total)),
                    None => Value::Empty,
                })
                .collect();
            Column::new(column.name.clone(), percents)
        })
        .collect();

    Ok(table.with_columns(columns)?.dedup_rows())
}

/// Long table: replaces `value` with its percentage of the total of all rows
/// sharing the same index label. Other columns are untouched.
pub fn percent_within_index_groups(
    table: &Table,
    value: &str,
    zero_total: ZeroTotal,
) -> Result<Table, TableError> {
    let values = table.numbers(value)?;

    let mut totals: FxHashMap<&IndexLabel, f64> = FxHashMap::default();
    for (index, v) in table.index().iter().zip(&values) {
        *totals.entry(index).or_insert(0.0) += v.unwrap_or(0.0);
    }

    let percents = table
        .index()
        .iter()
        .zip(&values)
        .map(|(index, v)| match v {
            Some(v) => Value::Number(percent_of(*v, totals[index], zero_total)),
            None => Value::Empty,
        })
        .collect();

    log::debug!(target: "NORMALIZE", "'{}' over {} index groups", value, totals.len());

    Ok(table.replace_values(value, percents)?.dedup_rows())
}

/// Runs the normalization described by `spec`.
pub fn normalize(table: &Table, spec: &NormalizeSpec) -> Result<Table, TableError> {
    match spec {
        NormalizeSpec::RowTotal { zero_total } => percent_of_row_total(table, *zero_total),
        NormalizeSpec::IndexGroups { value, zero_total } => {
            percent_within_index_groups(table, value, *zero_total)
        }
    }
}

// ============================================================================
// SHARE OF TOTAL
// ============================================================================

/// One category's slice of the grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub entity: String,
    pub value: f64,
    pub percent: f64,
    /// Legend text, e.g. `"Uniswap (42.0%)"`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareBreakdown {
    /// Largest first.
    pub shares: Vec<Share>,
    pub total: f64,
}

impl ShareBreakdown {
    /// Lays the breakdown out as a table indexed by legend label with
    /// `category`, `value` and `percentage` columns.
    pub fn to_table(&self, category: &str, value: &str) -> Result<Table, TableError> {
        let index = self
            .shares
            .iter()
            .map(|s| IndexLabel::Key(s.label.clone()))
            .collect();
        Table::new(
            index,
            vec![
                Column::text(category, self.shares.iter().map(|s| s.entity.as_str())),
                Column::numeric(value, self.shares.iter().map(|s| s.value)),
                Column::numeric("percentage", self.shares.iter().map(|s| s.percent)),
            ],
        )
        .map(|t| t.with_index_name("legend_label"))
    }
}

/// Sums `value` per category and expresses each sum as a share of the grand
/// total (a pie or donut breakdown).
pub fn share_of_total(table: &Table, category: &str, value: &str) -> Result<ShareBreakdown, TableError> {
    let mut sums = sum_by_category(table, category, value)?;
    let total: f64 = sums.iter().map(|(_, v)| v).sum();

    sums.sort_by(|a, b| compare_scores(Some(a.1), Some(b.1), Direction::Descending));

    let shares = sums
        .into_iter()
        .map(|(entity, value)| {
            let percent = percent_of(value, total, ZeroTotal::Zero);
            let label = format!("{} ({:.1}%)", entity, percent);
            Share {
                entity,
                value,
                percent,
                label,
            }
        })
        .collect();

    Ok(ShareBreakdown { shares, total })
}

fn percent_of(value: f64, total: f64, zero_total: ZeroTotal) -> f64 {
    if total != 0.0 {
        value / total * 100.0
    } else {
        match zero_total {
            ZeroTotal::Zero => 0.0,
            ZeroTotal::Undefined => f64::NAN,
        }
    }
}
