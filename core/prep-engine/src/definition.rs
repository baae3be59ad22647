//! FILENAME: core/prep-engine/src/definition.rs
//! Preparation Definition - The serializable description of a transform.
//!
//! These structures describe WHAT to rank, collapse or normalize. They carry
//! no data and can be stored next to a chart configuration.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ============================================================================
// DIRECTION
// ============================================================================

/// Sort direction of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Largest first.
    Descending,
    Ascending,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Descending
    }
}

impl Direction {
    /// Orders two scores. NaN compares equal so stable sorts keep source order.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Direction::Descending => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            Direction::Ascending => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }
}

// ============================================================================
// RANKING
// ============================================================================

/// Which ranking policy orders the entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RankSpec {
    /// Long table: each category's value at the table's latest index value.
    /// Categories that stopped reporting score 0.
    LatestPerEntity {
        category: String,
        value: String,
        #[serde(default)]
        direction: Direction,
    },
    /// Long table: each category's summed value over all rows.
    Sum {
        category: String,
        value: String,
        #[serde(default)]
        direction: Direction,
    },
    /// Long table: categories in the order their rows sort by value.
    RowValue {
        category: String,
        value: String,
        #[serde(default)]
        direction: Direction,
    },
    /// Wide table: columns ranked by their value in the final row.
    LastRow {
        #[serde(default)]
        direction: Direction,
    },
}

impl RankSpec {
    pub fn direction(&self) -> Direction {
        match self {
            RankSpec::LatestPerEntity { direction, .. }
            | RankSpec::Sum { direction, .. }
            | RankSpec::RowValue { direction, .. }
            | RankSpec::LastRow { direction } => *direction,
        }
    }
}

// ============================================================================
// COLLAPSING
// ============================================================================

/// What happens to the entities ranked below the top N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remainder {
    /// Aggregate into an entity named "Other".
    Other,
    /// Aggregate into "Others (<count>)".
    OtherWithCount,
    /// Discard them.
    Drop,
}

impl Default for Remainder {
    fn default() -> Self {
        Remainder::Other
    }
}

impl Remainder {
    /// Label of the aggregate entity for `collapsed` entities, `None` when the
    /// remainder is dropped.
    pub fn label(self, collapsed: usize) -> Option<String> {
        match self {
            Remainder::Other => Some(OTHER_LABEL.to_string()),
            Remainder::OtherWithCount => Some(format!("Others ({})", collapsed)),
            Remainder::Drop => None,
        }
    }

    /// Whether `name` is a label this remainder could produce. Such entities
    /// are never kept; they are folded into the new aggregate.
    pub fn reserves(self, name: &str) -> bool {
        match self {
            Remainder::Other => name == OTHER_LABEL,
            Remainder::OtherWithCount => name
                .strip_prefix("Others (")
                .and_then(|rest| rest.strip_suffix(')'))
                .is_some_and(|count| !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit())),
            Remainder::Drop => false,
        }
    }
}

/// Name of the synthetic aggregate entity.
pub const OTHER_LABEL: &str = "Other";

/// A complete top-N request: how to rank, how many to keep, what to do with
/// the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapseSpec {
    pub rank: RankSpec,
    pub top_n: usize,
    #[serde(default)]
    pub remainder: Remainder,
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Output for a row or group whose total is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroTotal {
    /// Every share in that row/group is 0%.
    Zero,
    /// Every share in that row/group is NaN.
    Undefined,
}

impl Default for ZeroTotal {
    fn default() -> Self {
        ZeroTotal::Zero
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NormalizeSpec {
    /// Wide table: each cell as a share of its row total.
    RowTotal {
        #[serde(default)]
        zero_total: ZeroTotal,
    },
    /// Long table: each value as a share of the rows sharing its index label.
    IndexGroups {
        value: String,
        #[serde(default)]
        zero_total: ZeroTotal,
    },
}
