//! FILENAME: core/table/src/lib.rs
//! PURPOSE: Main library entry point for the table data model.
//! CONTEXT: Re-exports the types shared by the formatting, preparation and
//! chart support crates.

pub mod error;
pub mod table;
pub mod value;

pub use error::TableError;
pub use table::{Column, Table};
pub use value::{IndexLabel, Value};
