//! FILENAME: tests/common/mod.rs
//! Fixtures for the preparation engine integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use prep_engine::Table;
use table::{Column, IndexLabel};

pub const TOLERANCE: f64 = 1e-6;

/// Midnight of the given day.
pub fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

/// Daily active users per app, one row per (day, app).
pub struct ActiveUsersFixture;

impl ActiveUsersFixture {
    pub fn rows() -> Vec<(NaiveDateTime, &'static str, f64)> {
        vec![
            (day(2024, 1, 1), "Jupiter", 120.0),
            (day(2024, 1, 1), "Raydium", 80.0),
            (day(2024, 1, 1), "Orca", 40.0),
            (day(2024, 1, 1), "Drift", 500.0),
            (day(2024, 1, 2), "Jupiter", 150.0),
            (day(2024, 1, 2), "Raydium", 60.0),
            (day(2024, 1, 2), "Orca", 45.0),
            (day(2024, 1, 3), "Jupiter", 170.0),
            (day(2024, 1, 3), "Raydium", 90.0),
            (day(2024, 1, 3), "Orca", 10.0),
        ]
    }

    pub fn table() -> Table {
        let rows = Self::rows();
        Table::new(
            rows.iter().map(|(d, _, _)| IndexLabel::Time(*d)).collect(),
            vec![
                Column::text("app", rows.iter().map(|(_, a, _)| *a)),
                Column::numeric("users", rows.iter().map(|(_, _, u)| *u)),
            ],
        )
        .unwrap()
        .with_index_name("date")
    }
}

/// Transactions per chain, one column per chain.
pub struct ChainsFixture;

impl ChainsFixture {
    pub fn table() -> Table {
        Table::new(
            vec![
                IndexLabel::Time(day(2024, 3, 1)),
                IndexLabel::Time(day(2024, 3, 2)),
                IndexLabel::Time(day(2024, 3, 3)),
            ],
            vec![
                Column::numeric("ethereum", [10.0, 12.0, 11.0]),
                Column::numeric("solana", [40.0, 38.0, 45.0]),
                Column::numeric("base", [5.0, 9.0, 14.0]),
                Column::numeric("arbitrum", [7.0, 6.0, 4.0]),
                Column::numeric("polygon", [2.5, 3.0, 3.5]),
            ],
        )
        .unwrap()
        .with_index_name("date")
    }
}

pub fn row_sum(table: &Table, row: usize) -> f64 {
    table
        .columns()
        .iter()
        .map(|c| c.values[row].as_number().unwrap_or(0.0))
        .sum()
}
