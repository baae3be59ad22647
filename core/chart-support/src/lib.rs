//! FILENAME: core/chart-support/src/lib.rs
//! Everything around the preparation engine that a chart needs: getting a
//! table in, giving it a time index, trimming the running period, cleaning
//! labels, picking colors and finishing the figure.
//!
//! Collaborators are traits (`TableLoader`, `TimeIndexer`, `PeriodTrimmer`,
//! `LabelCleaner`, `PaletteProvider`, `ChartRenderer`) with one reference
//! implementation each, except the renderer, which callers provide.

pub mod annotate;
pub mod error;
pub mod finish;
pub mod labels;
pub mod loader;
pub mod palette;
pub mod period;
pub mod prepare;
pub mod resample;
pub mod time_index;

pub use annotate::{latest_value, LatestValue};
pub use error::{ChartError, LoadError, RenderError};
pub use finish::{finish, ChartRenderer, FinishOptions, Position};
pub use labels::{title_case, CleanedLabels, LabelCleaner, TitleCaseCleaner};
pub use loader::{LoaderConfig, MemoryLoader, TableLoader};
pub use palette::{PaletteOrder, PaletteProvider, QualitativePalette};
pub use period::{period_start, CalendarTrimmer, PeriodHint, PeriodTrimmer};
pub use prepare::{apply_missing_policy, filter_date_range, prepare, MissingPolicy, PrepareOptions, Prepared};
pub use resample::{resample, Aggregation, Frequency, Resample};
pub use time_index::{parse_time, ColumnNameIndexer, TimeIndexer};
