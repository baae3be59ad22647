//! FILENAME: core/value-format/src/lib.rs
//! Value formatting for chart labels.
//!
//! Pure functions from a number to a short display string. Nothing here reads
//! tables; callers format whichever cells they annotate.

pub mod abbreviate;

pub use abbreviate::{
    format_count, format_currency, format_magnitude, Abbreviate, MagnitudeStyle, NON_FINITE,
};
