//! FILENAME: core/prep-engine/src/rank.rs
//! Rank Engine - Orders the entities of a table.
//!
//! An entity is a column (wide table) or a distinct value of a category
//! column (long table). Every ranking sorts stably: entities with equal
//! scores keep the order in which they first appear in the source. Missing
//! scores (empty cells, NaN) always sort last.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use table::{Table, TableError};

use crate::definition::{Direction, RankSpec};

// ============================================================================
// RANKING
// ============================================================================

/// An ordered list of entity names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    entities: Vec<String>,
    direction: Direction,
}

impl Ranking {
    pub fn new(entities: Vec<String>, direction: Direction) -> Self {
        Ranking {
            entities,
            direction,
        }
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The entity at rank `position` (0 = first).
    pub fn entity(&self, position: usize) -> Result<&str, TableError> {
        self.entities
            .get(position)
            .map(String::as_str)
            .ok_or(TableError::OutOfRange {
                index: position,
                len: self.entities.len(),
            })
    }

    /// Splits into the first `n` entities and the rest. `n` past the end keeps
    /// everything.
    pub fn split(&self, n: usize) -> (&[String], &[String]) {
        self.entities.split_at(n.min(self.entities.len()))
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.iter().any(|e| e == entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entities
    }
}

// ============================================================================
// RANKING POLICIES
// ============================================================================

/// Ranks categories by their value at the latest index label of the table.
///
/// Each category contributes its last row in index order. Categories whose
/// last row is at the table-wide maximum index keep that row's value; all
/// others score 0 and are listed after them before sorting. Both groups
/// follow first appearance in the source rows, so equal scores keep it.
pub fn rank_by_latest_per_entity(
    table: &Table,
    category: &str,
    value: &str,
    direction: Direction,
) -> Result<Ranking, TableError> {
    let labels = table.labels(category)?;
    let values = table.numbers(value)?;

    let order = table.index_order();
    let Some(&latest_row) = order.last() else {
        return Ok(Ranking::new(Vec::new(), direction));
    };
    let latest = &table.index()[latest_row];

    // Ties and stale categories keep first appearance in source rows
    let entities = distinct(labels.iter().map(String::as_str));
    let mut last_row: FxHashMap<&str, usize> = FxHashMap::default();
    for &row in &order {
        last_row.insert(labels[row].as_str(), row);
    }

    let mut reporting = Vec::new();
    let mut stale = Vec::new();
    for entity in entities {
        let row = last_row[entity.as_str()];
        if &table.index()[row] == latest {
            reporting.push((entity, values[row]));
        } else {
            stale.push((entity, Some(0.0)));
        }
    }

    log::debug!(
        target: "RANK",
        "latest-per-entity at {}: {} reporting, {} stale",
        latest,
        reporting.len(),
        stale.len()
    );

    reporting.extend(stale);
    Ok(order_by_score(reporting, direction))
}

/// Ranks the columns of a wide table by their value in the final row.
///
/// Descending puts the smallest column last (bottom of a stacked chart),
/// ascending puts it first. Without rows every score is missing, so the
/// columns keep source order.
pub fn rank_columns_by_last_row(table: &Table, direction: Direction) -> Result<Ranking, TableError> {
    let Some(last) = table.row_count().checked_sub(1) else {
        let names = table.column_names().into_iter().map(str::to_string).collect();
        return Ok(Ranking::new(names, direction));
    };

    let scored = table
        .columns()
        .iter()
        .map(|column| {
            let score = table.numbers(&column.name)?[last];
            Ok((column.name.clone(), score))
        })
        .collect::<Result<Vec<_>, TableError>>()?;

    Ok(order_by_score(scored, direction))
}

/// Ranks categories by the sum of their values over every row.
/// Empty cells count as zero.
pub fn rank_by_sum(
    table: &Table,
    category: &str,
    value: &str,
    direction: Direction,
) -> Result<Ranking, TableError> {
    let scored = sum_by_category(table, category, value)?
        .into_iter()
        .map(|(entity, total)| (entity, Some(total)))
        .collect();
    Ok(order_by_score(scored, direction))
}

/// Sorts rows by value and lists categories in the order they then appear.
pub fn rank_by_row_value(
    table: &Table,
    category: &str,
    value: &str,
    direction: Direction,
) -> Result<Ranking, TableError> {
    let labels = table.labels(category)?;
    let values = table.numbers(value)?;

    let mut rows: Vec<usize> = (0..table.row_count()).collect();
    rows.sort_by(|&a, &b| compare_scores(values[a], values[b], direction));

    let entities = distinct(rows.iter().map(|&row| labels[row].as_str()));
    Ok(Ranking::new(entities, direction))
}

/// Categories in order of first appearance, unranked.
pub fn rank_in_source_order(table: &Table, category: &str) -> Result<Ranking, TableError> {
    let labels = table.labels(category)?;
    let entities = distinct(labels.iter().map(String::as_str));
    Ok(Ranking::new(entities, Direction::default()))
}

/// Runs the ranking described by `spec`.
pub fn rank_entities(table: &Table, spec: &RankSpec) -> Result<Ranking, TableError> {
    match spec {
        RankSpec::LatestPerEntity { category, value, direction } => {
            rank_by_latest_per_entity(table, category, value, *direction)
        }
        RankSpec::Sum { category, value, direction } => rank_by_sum(table, category, value, *direction),
        RankSpec::RowValue { category, value, direction } => {
            rank_by_row_value(table, category, value, *direction)
        }
        RankSpec::LastRow { direction } => rank_columns_by_last_row(table, *direction),
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Per-category sums in order of first appearance.
pub(crate) fn sum_by_category(
    table: &Table,
    category: &str,
    value: &str,
) -> Result<Vec<(String, f64)>, TableError> {
    let labels = table.labels(category)?;
    let values = table.numbers(value)?;

    let mut sums: Vec<(String, f64)> = Vec::new();
    let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
    for (label, amount) in labels.iter().zip(&values) {
        let pos = *positions.entry(label.as_str()).or_insert_with(|| {
            sums.push((label.clone(), 0.0));
            sums.len() - 1
        });
        sums[pos].1 += amount.unwrap_or(0.0);
    }
    Ok(sums)
}

/// Orders scores in `direction`, missing and NaN scores last.
pub(crate) fn compare_scores(a: Option<f64>, b: Option<f64>, direction: Direction) -> Ordering {
    let a = a.filter(|v| !v.is_nan());
    let b = b.filter(|v| !v.is_nan());
    match (a, b) {
        (Some(a), Some(b)) => direction.compare(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn order_by_score(mut scored: Vec<(String, Option<f64>)>, direction: Direction) -> Ranking {
    // sort_by is stable
    scored.sort_by(|a, b| compare_scores(a.1, b.1, direction));
    Ranking::new(scored.into_iter().map(|(entity, _)| entity).collect(), direction)
}

fn distinct<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = rustc_hash::FxHashSet::default();
    labels
        .filter(|label| seen.insert(*label))
        .map(str::to_string)
        .collect()
}
