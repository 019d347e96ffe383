use std::fmt;

use bigdecimal::BigDecimal;
use num_traits::{ToPrimitive, Zero};

use crate::EvalError;

/// A value produced by evaluating a formula.
///
/// Formulas compute decimal numbers. Comparisons and logical operators yield
/// booleans, which can feed conditions but not arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number(BigDecimal),
    Bool(bool),
}

impl Value {
    /// Returns the decimal held by this value.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Type`] if the value is a boolean.
    pub fn as_number(&self) -> Result<&BigDecimal, EvalError> {
        match self {
            Value::Number(number) => Ok(number),
            Value::Bool(_) => Err(EvalError::Type {
                expected: "a number",
                found: self.to_string(),
            }),
        }
    }

    /// Consumes the value and returns its decimal.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Type`] if the value is a boolean.
    pub fn into_number(self) -> Result<BigDecimal, EvalError> {
        match self {
            Value::Number(number) => Ok(number),
            Value::Bool(_) => Err(EvalError::Type {
                expected: "a number",
                found: self.to_string(),
            }),
        }
    }

    /// Returns the truthiness of the value.
    ///
    /// Numbers are true when non-zero.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(number) => !number.is_zero(),
            Value::Bool(flag) => *flag,
        }
    }

    /// Converts the value to an `f64`, mapping booleans to `1.0` and `0.0`.
    ///
    /// Returns `None` if the number cannot be represented.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Number(number) => number.to_f64(),
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(number) => write!(f, "{number}"),
            Value::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<BigDecimal> for Value {
    fn from(number: BigDecimal) -> Self {
        Value::Number(number)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Number(BigDecimal::from(number))
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}
