//! Plain-text numeric tables.
//!
//! Writes numbers the way C's `%g` does, independent of locale, and reads
//! whitespace-separated numeric tokens back.

use xfmkit_core::{Result, TransformError};

/// Significant digits used by `%g` when no precision is given.
pub const GENERAL_PRECISION: usize = 6;

/// Formatting options for matrix text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    /// Significant digits per value. Zero behaves like one, as in C.
    pub precision: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            precision: GENERAL_PRECISION,
        }
    }
}

impl FormatConfig {
    /// Create a format config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of significant digits.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

/// Format a value in general notation with `precision` significant digits.
///
/// Scientific notation is used when the decimal exponent is below -4 or at
/// least `precision`; trailing zeros are removed in both notations.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let precision = precision.max(1);
    // Round once in scientific form to learn the exponent after rounding.
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.unsigned_abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Read every whitespace-separated token of `text` as a number.
pub fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|e| TransformError::parse(format!("invalid number '{token}': {e}")))
        })
        .collect()
}

/// Read exactly `N` numbers from `text`.
pub fn parse_exact<const N: usize>(text: &str) -> Result<[f64; N]> {
    let values = parse_numbers(text)?;
    let actual = values.len();
    values
        .try_into()
        .map_err(|_| TransformError::TokenCount { expected: N, actual })
}
