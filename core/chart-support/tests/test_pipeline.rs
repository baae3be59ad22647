//! FILENAME: tests/test_pipeline.rs
//! Load, prepare, collapse, clean and annotate one dataset end to end.

use chart_support::{
    latest_value, prepare, CalendarTrimmer, ColumnNameIndexer, LabelCleaner, MemoryLoader,
    MissingPolicy, PeriodHint, PrepareOptions, TitleCaseCleaner,
};
use chrono::NaiveDate;
use prep_engine::{
    collapse_columns, percent_of_row_total, rank_columns_by_last_row, Direction, Remainder,
    ZeroTotal,
};
use table::{Column, Table, Value};

fn chain_fees() -> MemoryLoader {
    let table = Table::from_columns(vec![
        Column::text(
            "week",
            ["2024-04-29", "2024-05-06", "2024-05-13", "2024-05-06", "2024-05-20"],
        ),
        Column::numeric("ethereum_l1", [90.0, 80.0, 85.0, 80.0, 10.0]),
        Column::numeric("op_mainnet", [5.0, 6.0, 4.0, 6.0, 1.0]),
        Column::numeric("base", [30.0, 35.0, 50.0, 35.0, 2.0]),
        Column::new(
            "zksync_era",
            vec![Value::Number(2.0), Value::Empty, Value::Number(1.0), Value::Empty, Value::Empty],
        ),
    ])
    .unwrap();
    MemoryLoader::new().with_table("data/chain_fees.csv", table)
}

fn prepared() -> Table {
    let options = PrepareOptions {
        file: "chain_fees.csv".to_string(),
        missing: MissingPolicy::FillZero,
        ..PrepareOptions::default()
    };
    // 2024-05-22 is in the week starting 2024-05-20
    let trimmer = CalendarTrimmer::new(NaiveDate::from_ymd_opt(2024, 5, 22).unwrap());
    let prepared = prepare(&chain_fees(), &ColumnNameIndexer::default(), &trimmer, &options).unwrap();
    assert_eq!(prepared.period, PeriodHint::Week);
    prepared.table
}

#[test]
fn test_weekly_rows_are_deduplicated_and_trimmed() {
    let table = prepared();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.index_name(), Some("week"));
    assert_eq!(
        table.numbers("zksync_era").unwrap(),
        vec![Some(2.0), Some(0.0), Some(1.0)]
    );
}

#[test]
fn test_collapse_then_normalize_then_clean() {
    let table = prepared();
    let ranking = rank_columns_by_last_row(&table, Direction::Descending).unwrap();
    let top = collapse_columns(&table, &ranking, 2, Remainder::Other).unwrap();
    assert_eq!(top.column_names(), vec!["ethereum_l1", "base", "Other"]);

    let shares = percent_of_row_total(&top, ZeroTotal::Zero).unwrap();
    let cleaned = TitleCaseCleaner
        .clean(&shares, &["ethereum_l1"], &["l1"], &[("Ethereum L1".to_string(), "Ethereum".to_string())])
        .unwrap();

    assert_eq!(cleaned.table.column_names(), vec!["Ethereum L1", "Base", "Other"]);
    assert_eq!(cleaned.names, vec!["Ethereum"]);

    // Week of 2024-05-13: 85 / 140
    let last = cleaned.table.numbers("Ethereum L1").unwrap()[2].unwrap();
    assert!((last - 60.714286).abs() < 1e-5);
}

#[test]
fn test_latest_annotation() {
    let table = prepared();
    let latest = latest_value(&table, "base").unwrap().unwrap();
    assert_eq!(latest.value, "50");
    assert_eq!(latest.date, "05-13-2024");
}
