//! FILENAME: core/table/src/value.rs
//! PURPOSE: Defines the values a table cell and a table row index can hold.
//! CONTEXT: `Value` is the payload of a column cell, `IndexLabel` labels a row.
//! Both are plain data; hashing of floats goes through `ValueKey` so that rows
//! can be compared for deduplication.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The content of a single table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing observation.
    Empty,
    Number(f64),
    Text(String),
    Time(NaiveDateTime),
}

impl Value {
    /// Returns the numeric payload, `None` for anything else.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Renders the value as an entity label (category names, legend entries).
    pub fn label(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) => {
                // Whole numbers print without a trailing ".0"
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
            Value::Time(t) => format_time(t),
        }
    }

    /// Parses spreadsheet-style numeric text such as `"$1,234"`, `"12.5%"` or
    /// `"#DIV/0!"`. Anything that does not parse becomes `Empty`.
    pub fn parse_numeric_text(text: &str) -> Value {
        let cleaned: String = text
            .replace("#DIV/0!", "")
            .chars()
            .filter(|c| !matches!(c, '%' | ',' | '$'))
            .collect();

        match cleaned.trim().parse::<f64>() {
            Ok(n) if !n.is_nan() => Value::Number(n),
            _ => Value::Empty,
        }
    }

    /// Text cells are coerced with [`Value::parse_numeric_text`]; times are
    /// not numeric and become `Empty`.
    pub fn coerce_numeric(&self) -> Value {
        match self {
            Value::Text(s) => Value::parse_numeric_text(s),
            Value::Time(_) => Value::Empty,
            other => other.clone(),
        }
    }

    pub(crate) fn key(&self) -> ValueKey {
        match self {
            Value::Empty => ValueKey::Empty,
            Value::Number(n) => ValueKey::Number(float_bits(*n)),
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::Time(t) => ValueKey::Time(*t),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::Time(t)
    }
}

/// Hashable projection of a [`Value`].
/// All NaN payloads collapse onto one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Empty,
    Number(u64),
    Text(String),
    Time(NaiveDateTime),
}

fn float_bits(n: f64) -> u64 {
    if n.is_nan() {
        u64::MAX
    } else if n == 0.0 {
        // -0.0 and 0.0 are the same observation
        0
    } else {
        n.to_bits()
    }
}

// ============================================================================
// INDEX LABELS
// ============================================================================

/// Label of one table row.
///
/// Variant order is significant: deriving `Ord` sorts positional rows first,
/// then timestamps, then keys, and unlabeled aggregate rows last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexLabel {
    /// Default positional index.
    Row(usize),
    Time(NaiveDateTime),
    Key(String),
    /// Appended aggregate rows that are not aligned to any index value.
    Unlabeled,
}

impl IndexLabel {
    pub fn as_time(&self) -> Option<NaiveDateTime> {
        match self {
            IndexLabel::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexLabel::Row(n) => write!(f, "{}", n),
            IndexLabel::Time(t) => f.write_str(&format_time(t)),
            IndexLabel::Key(k) => f.write_str(k),
            IndexLabel::Unlabeled => Ok(()),
        }
    }
}

fn format_time(t: &NaiveDateTime) -> String {
    if t.time() == NaiveTime::MIN {
        t.format("%Y-%m-%d").to_string()
    } else {
        t.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
