//! Numeric literal recognition and conversion.
//!
//! Equations whose text is a bare number skip the parser entirely, so the
//! classifier must agree with the lexer on what a number looks like.

use std::str::FromStr;

use bigdecimal::{BigDecimal, ParseBigDecimalError};

use crate::Value;

/// Returns the decimal value of `text` if it is a bare numeric literal.
///
/// Surrounding ASCII whitespace is ignored. Accepted forms are an optional
/// sign, digits with an optional fraction (or a fraction alone, as in
/// `.5`), and an optional exponent.
///
/// # Examples
///
/// ```
/// use hesabu_expr::types::as_numeric;
///
/// assert!(as_numeric(" -1.50 ").is_some());
/// assert!(as_numeric("1e3").is_some());
/// assert!(as_numeric("a + 1").is_none());
/// ```
#[must_use]
pub fn as_numeric(text: &str) -> Option<BigDecimal> {
    let text = text.trim_ascii();
    if is_numeric_literal(text) {
        as_bigdecimal(text).ok()
    } else {
        None
    }
}

/// Converts a numeric literal to an arbitrary-precision decimal.
///
/// # Errors
///
/// Returns an error if `text` is not a valid decimal literal.
pub fn as_bigdecimal(text: &str) -> Result<BigDecimal, ParseBigDecimalError> {
    let text = text.trim_ascii();
    let text = text.strip_prefix('+').unwrap_or(text);

    // Give a bare fraction an explicit leading zero.
    match text.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => BigDecimal::from_str(&format!("-0{rest}")),
        None if text.starts_with('.') => BigDecimal::from_str(&format!("0{text}")),
        _ => BigDecimal::from_str(text),
    }
}

/// Integers with at most this many trailing zeros are written out in full.
const MAX_PLAIN_ZEROS: i64 = 64;

/// Normalizes a solved value for presentation.
///
/// Numbers lose insignificant trailing zeros, so `2.000` becomes `2`, and
/// integers are kept in plain notation (`10`, never `1E+1`) unless that
/// would take more than a few dozen trailing zeros. Booleans are returned
/// unchanged.
#[must_use]
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Number(number) => {
            let number = number.normalized();
            let (_, scale) = number.as_bigint_and_exponent();
            if (-MAX_PLAIN_ZEROS..0).contains(&scale) {
                Value::Number(number.with_scale(0))
            } else {
                Value::Number(number)
            }
        }
        other @ Value::Bool(_) => other,
    }
}

/// Scans `[+-]?(digits[.digits]|.digits)([eE][+-]?digits)?` over the whole text.
fn is_numeric_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let integral = count_digits(&bytes[pos..]);
    pos += integral;

    let mut fractional = 0;
    if bytes.get(pos) == Some(&b'.') {
        fractional = count_digits(&bytes[pos + 1..]);
        if fractional == 0 {
            return false;
        }
        pos += 1 + fractional;
    }

    if integral == 0 && fractional == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exponent = count_digits(&bytes[pos..]);
        if exponent == 0 {
            return false;
        }
        pos += exponent;
    }

    pos == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
