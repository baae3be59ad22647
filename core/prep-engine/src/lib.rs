//! FILENAME: core/prep-engine/src/lib.rs
//! Chart preparation engine.
//!
//! Turns an arbitrary table into a bounded, ordered, presentation-ready one.
//! It depends on `table` for the data model only.
//!
//! Layers:
//! - `definition`: Serializable requests (WHAT to rank, collapse, normalize)
//! - `rank`: Entity orderings (WHO comes first)
//! - `collapse`: Top-N with an aggregate remainder (WHAT is kept)
//! - `normalize`: Percent-of-total transforms (HOW values are scaled)

pub mod definition;
pub mod rank;
pub mod collapse;
pub mod normalize;

pub use definition::*;
pub use rank::{
    rank_by_latest_per_entity, rank_by_row_value, rank_by_sum, rank_columns_by_last_row,
    rank_entities, rank_in_source_order, Ranking,
};
pub use collapse::{collapse, collapse_columns, collapse_per_index, collapse_to_total, top_rows};
pub use normalize::{
    normalize, percent_of_row_total, percent_within_index_groups, share_of_total, Share,
    ShareBreakdown,
};
pub use table::{Table, TableError};
