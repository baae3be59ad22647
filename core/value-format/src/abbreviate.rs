//! FILENAME: core/value-format/src/abbreviate.rs
//! PURPOSE: Turns raw magnitudes into short chart labels ("1.5K", "-$2.3B").
//! CONTEXT: Bucket thresholds are checked largest first on the absolute value,
//! so the sign never changes which suffix is chosen.

use serde::{Deserialize, Serialize};

/// Returned for NaN and infinite input.
pub const NON_FINITE: &str = "n/a";

/// Suffix buckets for [`format_magnitude`], largest first.
const MAGNITUDE_BUCKETS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Decimal handling for [`format_magnitude`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnitudeStyle {
    /// When false every bucket except the sub-one bucket prints 0 places.
    pub decimals: bool,
    pub places: usize,
}

impl Default for MagnitudeStyle {
    fn default() -> Self {
        MagnitudeStyle {
            decimals: true,
            places: 1,
        }
    }
}

/// Abbreviates `value` with a T/B/M/K suffix.
///
/// Values below one keep two decimals regardless of `decimals`/`places`.
pub fn format_magnitude(value: f64, decimals: bool, places: usize) -> String {
    if !value.is_finite() {
        log::warn!(target: "FORMAT", "non-finite magnitude {}", value);
        return NON_FINITE.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs_value = value.abs();
    if abs_value < 1.0 {
        return format!("{:.2}", value);
    }

    let places = if decimals { places } else { 0 };
    let (scaled, suffix) = MAGNITUDE_BUCKETS
        .iter()
        .find(|(threshold, _)| abs_value >= *threshold)
        .map(|(threshold, suffix)| (value / threshold, *suffix))
        .unwrap_or((value, ""));

    format!("{:.prec$}{}", scaled, suffix, prec = places)
}

/// Dollar label with B/M/K buckets and thousands separators.
///
/// The minus sign goes before the symbol (`-$1.2B`). Values below one use two
/// significant digits.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        log::warn!(target: "FORMAT", "non-finite currency {}", value);
        return NON_FINITE.to_string();
    }

    let abs_value = value.abs();
    let body = if abs_value >= 1e9 {
        format!("{}B", grouped(abs_value / 1e9, 1))
    } else if abs_value >= 1e6 {
        format!("{}M", grouped(abs_value / 1e6, 1))
    } else if abs_value >= 1e3 {
        format!("{}K", grouped(abs_value / 1e3, 0))
    } else if abs_value >= 1e2 {
        grouped(abs_value, 0)
    } else if abs_value >= 1.0 {
        grouped(abs_value, 2)
    } else {
        format_significant(abs_value, 2)
    };

    if value < 0.0 {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// Whole-number label with thousands separators ("12,345").
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        log::warn!(target: "FORMAT", "non-finite count {}", value);
        return NON_FINITE.to_string();
    }
    grouped(value, 0)
}

fn grouped(value: f64, places: usize) -> String {
    add_thousands_separator(&format!("{:.prec$}", value, prec = places))
}

/// Add thousands separators to a numeric string.
fn add_thousands_separator(s: &str) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (s, None),
    };

    let negative = integer_part.starts_with('-');
    let digits: Vec<char> = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::with_capacity(s.len() + digits.len() / 3 + 1);
    if negative {
        result.push('-');
    }
    let len = digits.len();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

/// General format with `digits` significant digits: fixed notation unless the
/// exponent is below -4 or reaches `digits`, trailing zeros trimmed.
fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let digits = digits.max(1);

    // Rust's exponent form rounds the mantissa, which gives the exponent
    // after rounding ("9.99e-1" at 2 digits is "1.0e0").
    let scientific = format!("{:.prec$e}", value, prec = digits - 1);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs());
    }

    let places = (digits as i32 - 1 - exponent).max(0) as usize;
    trim_fraction(&format!("{:.prec$}", value, prec = places)).to_string()
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

// ============================================================================
// SCALAR / COLUMN DISPATCH
// ============================================================================

/// Formatting shared by single values and whole columns.
pub trait Abbreviate {
    type Output;

    fn abbreviate(&self, style: MagnitudeStyle) -> Self::Output;

    fn as_currency(&self) -> Self::Output;
}

impl Abbreviate for f64 {
    type Output = String;

    fn abbreviate(&self, style: MagnitudeStyle) -> String {
        format_magnitude(*self, style.decimals, style.places)
    }

    fn as_currency(&self) -> String {
        format_currency(*self)
    }
}

impl Abbreviate for [f64] {
    type Output = Vec<String>;

    fn abbreviate(&self, style: MagnitudeStyle) -> Vec<String> {
        self.iter().map(|v| v.abbreviate(style)).collect()
    }

    fn as_currency(&self) -> Vec<String> {
        self.iter().map(|v| format_currency(*v)).collect()
    }
}
