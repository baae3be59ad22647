//! FILENAME: core/chart-support/src/finish.rs
//! PURPOSE: Drives a chart renderer through its finishing steps.
//! CONTEXT: The renderer owns the figure; this module only decides which steps
//! run and in what order:
//!   clean_values -> group_data -> keep_top_n -> clean_columns -> create_fig
//!   -> show_index_and_cols -> add_title -> add_date -> add_dashed_line
//!   -> show_fig -> save_fig
//! `create_fig` and `add_title` always run; every other step is gated by
//! [`FinishOptions`]. The first failing step aborts the sequence.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, RenderError};
use crate::resample::Aggregation;

/// Figure-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

pub trait ChartRenderer {
    fn clean_values(&mut self) -> Result<(), RenderError>;
    fn group_data(&mut self, how: Aggregation) -> Result<(), RenderError>;
    /// `other` folds the remaining series into one aggregate series.
    fn keep_top_n(&mut self, top_n: Option<usize>, other: bool) -> Result<(), RenderError>;
    fn clean_columns(
        &mut self,
        preserve_upper: &[String],
        substitutions: &[(String, String)],
    ) -> Result<(), RenderError>;
    fn create_fig(&mut self) -> Result<(), RenderError>;
    fn show_index_and_cols(&mut self) -> Result<(), RenderError>;
    fn add_title(
        &mut self,
        title: Option<&str>,
        subtitle: Option<&str>,
        position: Position,
    ) -> Result<(), RenderError>;
    /// `date` overrides the date read from the data; `dt_index` says whether
    /// the data is indexed by time.
    fn add_date(
        &mut self,
        date: Option<NaiveDateTime>,
        position: Position,
        dt_index: bool,
    ) -> Result<(), RenderError>;
    fn add_dashed_line(
        &mut self,
        date: Option<NaiveDateTime>,
        annotation: Option<&str>,
    ) -> Result<(), RenderError>;
    fn show_fig(&mut self) -> Result<(), RenderError>;
    fn save_fig(&mut self, file_type: &str) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishOptions {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub title_position: Position,
    pub date_position: Position,
    pub clean_values: bool,
    pub group_data: bool,
    pub group_how: Aggregation,
    pub keep_top_n: bool,
    pub top_n: Option<usize>,
    pub other: bool,
    pub clean_columns: bool,
    pub preserve_upper: Vec<String>,
    /// Applied in order.
    pub substitutions: Vec<(String, String)>,
    pub show_index_and_cols: bool,
    pub add_date: bool,
    pub date: Option<NaiveDateTime>,
    pub dt_index: bool,
    pub dashed_line: bool,
    pub annotation_text: Option<String>,
    pub show: bool,
    pub save: bool,
    pub file_type: String,
}

impl Default for FinishOptions {
    fn default() -> Self {
        FinishOptions {
            title: None,
            subtitle: None,
            title_position: Position::new(0.1, 0.9),
            date_position: Position::new(0.05, 1.18),
            clean_values: false,
            group_data: false,
            group_how: Aggregation::Sum,
            keep_top_n: false,
            top_n: None,
            other: false,
            clean_columns: false,
            preserve_upper: Vec::new(),
            substitutions: Vec::new(),
            show_index_and_cols: true,
            add_date: true,
            date: None,
            dt_index: true,
            dashed_line: false,
            annotation_text: None,
            show: true,
            save: true,
            file_type: "svg".to_string(),
        }
    }
}

pub fn finish<R: ChartRenderer + ?Sized>(renderer: &mut R, options: &FinishOptions) -> Result<(), ChartError> {
    if options.clean_values {
        log::debug!(target: "FINISH", "clean_values");
        renderer.clean_values()?;
    }
    if options.group_data {
        log::debug!(target: "FINISH", "group_data ({:?})", options.group_how);
        renderer.group_data(options.group_how)?;
    }
    if options.keep_top_n {
        log::debug!(target: "FINISH", "keep_top_n ({:?}, other: {})", options.top_n, options.other);
        renderer.keep_top_n(options.top_n, options.other)?;
    }
    if options.clean_columns {
        log::debug!(target: "FINISH", "clean_columns");
        renderer.clean_columns(&options.preserve_upper, &options.substitutions)?;
    }

    renderer.create_fig()?;

    if options.show_index_and_cols {
        renderer.show_index_and_cols()?;
    }

    renderer.add_title(
        options.title.as_deref(),
        options.subtitle.as_deref(),
        options.title_position,
    )?;

    if options.add_date {
        renderer.add_date(options.date, options.date_position, options.dt_index)?;
    }
    if options.dashed_line {
        renderer.add_dashed_line(options.date, options.annotation_text.as_deref())?;
    }
    if options.show {
        renderer.show_fig()?;
    }
    if options.save {
        log::debug!(target: "FINISH", "save_fig as {}", options.file_type);
        renderer.save_fig(&options.file_type)?;
    }
    Ok(())
}
