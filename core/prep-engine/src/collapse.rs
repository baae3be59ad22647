//! FILENAME: core/prep-engine/src/collapse.rs
//! Top-N Collapser - Keeps the leading entities of a ranking and folds the
//! rest into one synthetic entity.
//!
//! Three table shapes are supported:
//! - wide tables, one column per entity (`collapse_columns`)
//! - long tables where the remainder is summed per index label
//!   (`collapse_per_index`)
//! - long tables where the remainder is summed into a single row
//!   (`collapse_to_total`)
//!
//! Every result is deduplicated before it is returned.

use rustc_hash::{FxHashMap, FxHashSet};
use table::{Column, IndexLabel, Table, TableError, Value};

use crate::definition::{CollapseSpec, Direction, RankSpec, Remainder};
use crate::rank::{compare_scores, rank_entities, Ranking};

/// Wide table: keeps the first `top_n` ranked columns (in ranking order) and
/// adds one column holding the row-wise sum of every other column.
///
/// No aggregate column is added when nothing is left over. Empty cells count
/// as zero in the aggregate. An input column already named like the
/// aggregate is never kept and is summed into it.
pub fn collapse_columns(
    table: &Table,
    ranking: &Ranking,
    top_n: usize,
    remainder: Remainder,
) -> Result<Table, TableError> {
    let kept = kept_entities(ranking, top_n, remainder);

    let mut columns = kept
        .iter()
        .map(|name| table.column(name).cloned())
        .collect::<Result<Vec<_>, _>>()?;

    let collapsed: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| !kept.contains(&c.name.as_str()))
        .collect();

    if let Some(label) = remainder.label(collapsed.len()).filter(|_| !collapsed.is_empty()) {
        let mut totals = vec![0.0; table.row_count()];
        for column in &collapsed {
            for (total, value) in totals.iter_mut().zip(table.numbers(&column.name)?) {
                *total += value.unwrap_or(0.0);
            }
        }
        columns.push(Column::numeric(label, totals));
    }

    log::debug!(
        target: "COLLAPSE",
        "columns: kept {}, collapsed {}",
        kept.len(),
        collapsed.len()
    );

    Ok(table.with_columns(columns)?.dedup_rows())
}

/// Long table: rows of the first `top_n` ranked categories are kept as they
/// are; the remaining rows are summed per index label into new rows whose
/// category is the aggregate label. The result is sorted by index.
///
/// Aggregate rows carry only the category and value; other columns are
/// `Empty`. Rows whose category is already the aggregate label are folded in.
pub fn collapse_per_index(
    table: &Table,
    category: &str,
    value: &str,
    ranking: &Ranking,
    top_n: usize,
    remainder: Remainder,
) -> Result<Table, TableError> {
    let split = split_rows(table, category, value, ranking, top_n, remainder)?;
    let mut result = table.take_rows(&split.kept_rows);

    if let Some(label) = remainder.label(split.collapsed).filter(|_| !split.other_rows.is_empty()) {
        let mut groups: Vec<(IndexLabel, f64)> = Vec::new();
        let mut positions: FxHashMap<&IndexLabel, usize> = FxHashMap::default();
        for &row in &split.other_rows {
            let index = &table.index()[row];
            let pos = *positions.entry(index).or_insert_with(|| {
                groups.push((index.clone(), 0.0));
                groups.len() - 1
            });
            groups[pos].1 += split.values[row].unwrap_or(0.0);
        }

        for (index, total) in groups {
            result.push_row(index, aggregate_row(table, split.category_pos, split.value_pos, &label, total))?;
        }
    }

    log::debug!(
        target: "COLLAPSE",
        "per-index on '{}': kept {} rows, folded {} rows of {} entities",
        category,
        split.kept_rows.len(),
        split.other_rows.len(),
        split.collapsed
    );

    Ok(result.sorted_by_index().dedup_rows())
}

/// Long table: rows of the first `top_n` ranked categories are kept; every
/// remaining row is summed into one aggregate row appended at the end with an
/// `Unlabeled` index. As in `collapse_per_index`, the aggregate label is
/// never kept.
pub fn collapse_to_total(
    table: &Table,
    category: &str,
    value: &str,
    ranking: &Ranking,
    top_n: usize,
    remainder: Remainder,
) -> Result<Table, TableError> {
    let split = split_rows(table, category, value, ranking, top_n, remainder)?;
    let mut result = table.take_rows(&split.kept_rows);

    if let Some(label) = remainder.label(split.collapsed).filter(|_| !split.other_rows.is_empty()) {
        let total: f64 = split
            .other_rows
            .iter()
            .map(|&row| split.values[row].unwrap_or(0.0))
            .sum();
        result.push_row(
            IndexLabel::Unlabeled,
            aggregate_row(table, split.category_pos, split.value_pos, &label, total),
        )?;
    }

    log::debug!(
        target: "COLLAPSE",
        "total on '{}': kept {} rows, folded {} rows",
        category,
        split.kept_rows.len(),
        split.other_rows.len()
    );

    Ok(result.dedup_rows())
}

/// The `n` rows with the largest `value`, largest first. Ties keep source
/// order.
pub fn top_rows(table: &Table, value: &str, n: usize) -> Result<Table, TableError> {
    let values = table.numbers(value)?;
    let mut rows: Vec<usize> = (0..table.row_count()).collect();
    rows.sort_by(|&a, &b| compare_scores(values[a], values[b], Direction::Descending));
    rows.truncate(n);
    Ok(table.take_rows(&rows))
}

/// Ranks and collapses in one step.
///
/// `LastRow` rankings collapse columns, `Sum` rankings collapse to a single
/// total row, and the remaining long-table rankings collapse per index label.
pub fn collapse(table: &Table, spec: &CollapseSpec) -> Result<Table, TableError> {
    let ranking = rank_entities(table, &spec.rank)?;
    match &spec.rank {
        RankSpec::LastRow { .. } => collapse_columns(table, &ranking, spec.top_n, spec.remainder),
        RankSpec::Sum { category, value, .. } => {
            collapse_to_total(table, category, value, &ranking, spec.top_n, spec.remainder)
        }
        RankSpec::LatestPerEntity { category, value, .. } | RankSpec::RowValue { category, value, .. } => {
            collapse_per_index(table, category, value, &ranking, spec.top_n, spec.remainder)
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// The first `top_n` ranked entities, skipping names the remainder reserves.
fn kept_entities(ranking: &Ranking, top_n: usize, remainder: Remainder) -> Vec<&str> {
    ranking
        .iter()
        .filter(|entity| !remainder.reserves(entity))
        .take(top_n)
        .collect()
}

struct RowSplit {
    category_pos: usize,
    value_pos: usize,
    values: Vec<Option<f64>>,
    kept_rows: Vec<usize>,
    other_rows: Vec<usize>,
    /// Number of distinct categories among `other_rows`.
    collapsed: usize,
}

fn split_rows(
    table: &Table,
    category: &str,
    value: &str,
    ranking: &Ranking,
    top_n: usize,
    remainder: Remainder,
) -> Result<RowSplit, TableError> {
    let category_pos = table.column_position(category)?;
    let value_pos = table.column_position(value)?;
    let values = table.numbers(value)?;
    let labels = table.labels(category)?;

    let kept: FxHashSet<&str> = kept_entities(ranking, top_n, remainder).into_iter().collect();

    let mut kept_rows = Vec::new();
    let mut other_rows = Vec::new();
    let mut collapsed: FxHashSet<&str> = FxHashSet::default();
    for (row, label) in labels.iter().enumerate() {
        if kept.contains(label.as_str()) {
            kept_rows.push(row);
        } else {
            collapsed.insert(label.as_str());
            other_rows.push(row);
        }
    }

    Ok(RowSplit {
        category_pos,
        value_pos,
        values,
        kept_rows,
        other_rows,
        collapsed: collapsed.len(),
    })
}

fn aggregate_row(table: &Table, category_pos: usize, value_pos: usize, label: &str, total: f64) -> Vec<Value> {
    let mut row = vec![Value::Empty; table.columns().len()];
    row[category_pos] = Value::Text(label.to_string());
    row[value_pos] = Value::Number(total);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{rank_by_sum, rank_columns_by_last_row};

    fn wide() -> Table {
        Table::from_columns(vec![
            Column::numeric("a", [5.0, 6.0]),
            Column::numeric("b", [1.0, 1.0]),
            Column::numeric("c", [3.0, 4.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_collapse_columns_with_count() {
        let table = wide();
        let ranking = rank_columns_by_last_row(&table, Direction::Descending).unwrap();
        let result = collapse_columns(&table, &ranking, 1, Remainder::OtherWithCount).unwrap();
        assert_eq!(result.column_names(), vec!["a", "Others (2)"]);
        assert_eq!(
            result.numbers("Others (2)").unwrap(),
            vec![Some(4.0), Some(5.0)]
        );
    }

    #[test]
    fn test_collapse_columns_drop() {
        let table = wide();
        let ranking = rank_columns_by_last_row(&table, Direction::Descending).unwrap();
        let result = collapse_columns(&table, &ranking, 2, Remainder::Drop).unwrap();
        assert_eq!(result.column_names(), vec!["a", "c"]);
    }

    #[test]
    fn test_collapse_columns_unknown_entity() {
        let table = wide();
        let ranking = Ranking::new(vec!["zzz".to_string()], Direction::Descending);
        assert_eq!(
            collapse_columns(&table, &ranking, 1, Remainder::Other).unwrap_err(),
            TableError::ColumnNotFound("zzz".to_string())
        );
    }

    #[test]
    fn test_collapse_to_total_appends_one_row() {
        let table = Table::from_columns(vec![
            Column::text("show", ["x", "y", "z", "y"]),
            Column::numeric("views", [10.0, 2.0, 3.0, 4.0]),
        ])
        .unwrap();
        let ranking = rank_by_sum(&table, "show", "views", Direction::Descending).unwrap();
        let result = collapse_to_total(&table, "show", "views", &ranking, 1, Remainder::Other).unwrap();

        assert_eq!(result.row_count(), 2);
        assert_eq!(result.labels("show").unwrap(), vec!["x", "Other"]);
        assert_eq!(result.numbers("views").unwrap(), vec![Some(10.0), Some(9.0)]);
        assert_eq!(result.index()[1], IndexLabel::Unlabeled);
    }

    #[test]
    fn test_existing_other_column_is_folded() {
        let table = Table::from_columns(vec![
            Column::numeric("a", [5.0, 6.0]),
            Column::numeric("Other", [9.0, 9.0]),
            Column::numeric("b", [1.0, 1.0]),
        ])
        .unwrap();
        let ranking = rank_columns_by_last_row(&table, Direction::Descending).unwrap();
        assert_eq!(ranking.entity(0).unwrap(), "Other");

        let result = collapse_columns(&table, &ranking, 1, Remainder::Other).unwrap();
        assert_eq!(result.column_names(), vec!["a", "Other"]);
        assert_eq!(result.numbers("Other").unwrap(), vec![Some(10.0), Some(10.0)]);

        // Nothing is reserved when the remainder is dropped
        let result = collapse_columns(&table, &ranking, 1, Remainder::Drop).unwrap();
        assert_eq!(result.column_names(), vec!["Other"]);
    }

    #[test]
    fn test_existing_other_category_is_folded() {
        let table = Table::new(
            vec![IndexLabel::Key("1".to_string()); 3],
            vec![
                Column::text("app", ["Other", "A", "B"]),
                Column::numeric("users", [5.0, 3.0, 1.0]),
            ],
        )
        .unwrap();
        let ranking = rank_by_sum(&table, "app", "users", Direction::Descending).unwrap();

        let result = collapse_per_index(&table, "app", "users", &ranking, 1, Remainder::Other).unwrap();
        assert_eq!(result.labels("app").unwrap(), vec!["A", "Other"]);
        assert_eq!(result.numbers("users").unwrap(), vec![Some(3.0), Some(6.0)]);

        let result = collapse_to_total(&table, "app", "users", &ranking, 1, Remainder::Other).unwrap();
        assert_eq!(result.labels("app").unwrap(), vec!["A", "Other"]);
        assert_eq!(result.numbers("users").unwrap(), vec![Some(3.0), Some(6.0)]);
    }

    #[test]
    fn test_top_rows() {
        let table = Table::from_columns(vec![Column::numeric("v", [1.0, 7.0, 3.0, 7.0])]).unwrap();
        let top = top_rows(&table, "v", 3).unwrap();
        assert_eq!(top.index(), &[IndexLabel::Row(1), IndexLabel::Row(3), IndexLabel::Row(2)]);
    }
}
