//! Built-in functions.
//!
//! Names are matched case-insensitively. Arguments arrive as compiled thunks
//! so that `IF` only evaluates the branch it selects.

use std::cmp::Ordering;

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::{
    Bindings, EvalError, Value,
    interpret::{Thunk, divide},
};

/// Largest number of digits `ROUND` may round to, on either side of the point.
const MAX_ROUND_DIGITS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    If,
    Sum,
    Min,
    Max,
    Avg,
    SafeDiv,
    Round,
    Abs,
    Sqrt,
    Floor,
    Ceiling,
    ScoreTable,
    Access,
    Stdevp,
}

impl Function {
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        let function = match name.to_ascii_lowercase().as_str() {
            "if" => Function::If,
            "sum" => Function::Sum,
            "min" => Function::Min,
            "max" => Function::Max,
            "avg" => Function::Avg,
            "safe_div" => Function::SafeDiv,
            "round" => Function::Round,
            "abs" => Function::Abs,
            "sqrt" => Function::Sqrt,
            "floor" => Function::Floor,
            "ceiling" => Function::Ceiling,
            "score_table" => Function::ScoreTable,
            "access" => Function::Access,
            "stdevp" => Function::Stdevp,
            _ => return None,
        };
        Some(function)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Function::If => "if",
            Function::Sum => "sum",
            Function::Min => "min",
            Function::Max => "max",
            Function::Avg => "avg",
            Function::SafeDiv => "safe_div",
            Function::Round => "round",
            Function::Abs => "abs",
            Function::Sqrt => "sqrt",
            Function::Floor => "floor",
            Function::Ceiling => "ceiling",
            Function::ScoreTable => "score_table",
            Function::Access => "access",
            Function::Stdevp => "stdevp",
        }
    }

    /// Checks the argument count, describing the expectation on failure.
    pub(crate) fn check_arity(self, count: usize) -> Result<(), String> {
        let (ok, expected) = match self {
            Function::If => (count == 3, "exactly 3 arguments"),
            Function::SafeDiv => (count == 2, "exactly 2 arguments"),
            Function::Abs | Function::Sqrt | Function::Floor | Function::Ceiling => {
                (count == 1, "exactly 1 argument")
            }
            Function::Round => ((1..=2).contains(&count), "1 or 2 arguments"),
            Function::Sum | Function::Min | Function::Max | Function::Avg | Function::Stdevp => {
                (count >= 1, "at least 1 argument")
            }
            Function::Access => (count >= 2, "at least 2 arguments"),
            Function::ScoreTable => (
                count >= 4 && (count - 1) % 3 == 0,
                "a value followed by (lower, upper, score) triples",
            ),
        };
        if ok { Ok(()) } else { Err(expected.to_string()) }
    }

    pub(crate) fn call(self, args: &[Thunk], bindings: &Bindings) -> Result<Value, EvalError> {
        let number = |index: usize| -> Result<BigDecimal, EvalError> {
            args[index](bindings)?.into_number()
        };
        let numbers = || -> Result<Vec<BigDecimal>, EvalError> {
            (0..args.len()).map(number).collect()
        };

        let result = match self {
            Function::If => {
                let branch = if args[0](bindings)?.is_truthy() { 1 } else { 2 };
                return args[branch](bindings);
            }
            Function::Sum => numbers()?.into_iter().sum(),
            Function::Min => extremum(numbers()?, Ordering::Less),
            Function::Max => extremum(numbers()?, Ordering::Greater),
            Function::Avg => mean(&numbers()?)?,
            Function::SafeDiv => {
                let (dividend, divisor) = (number(0)?, number(1)?);
                if divisor.is_zero() {
                    BigDecimal::zero()
                } else {
                    divide(dividend, divisor)?
                }
            }
            Function::Round => {
                let digits = if args.len() == 2 {
                    integer(&number(1)?, "round digits")?
                } else {
                    0
                };
                if !(-MAX_ROUND_DIGITS..=MAX_ROUND_DIGITS).contains(&digits) {
                    return Err(EvalError::Domain(format!(
                        "round digits must be between -{MAX_ROUND_DIGITS} and {MAX_ROUND_DIGITS} but was {digits}"
                    )));
                }
                round(number(0)?, digits, RoundingMode::HalfUp)
            }
            Function::Abs => number(0)?.abs(),
            Function::Sqrt => sqrt(&number(0)?)?,
            Function::Floor => round(number(0)?, 0, RoundingMode::Floor),
            Function::Ceiling => round(number(0)?, 0, RoundingMode::Ceiling),
            Function::ScoreTable => score_table(&numbers()?),
            Function::Access => {
                let mut values = numbers()?;
                let Some(index) = values.pop() else {
                    return Err(EvalError::Domain("access needs an index".into()));
                };
                let position = integer(&index, "access index")?;
                usize::try_from(position)
                    .ok()
                    .and_then(|position| values.get(position).cloned())
                    .ok_or_else(|| {
                        EvalError::Domain(format!(
                            "index {position} out of range for {} values",
                            values.len()
                        ))
                    })?
            }
            Function::Stdevp => {
                let values = numbers()?;
                let average = mean(&values)?;
                let squares: Vec<BigDecimal> = values
                    .iter()
                    .map(|value| {
                        let deviation = value - &average;
                        &deviation * &deviation
                    })
                    .collect();
                sqrt(&mean(&squares)?)?
            }
        };

        Ok(Value::Number(result))
    }
}

/// Returns the smallest (`Less`) or largest (`Greater`) value, keeping the first on ties.
fn extremum(values: Vec<BigDecimal>, keep: Ordering) -> BigDecimal {
    values
        .into_iter()
        .reduce(|best, value| if value.cmp(&best) == keep { value } else { best })
        .unwrap_or_else(BigDecimal::zero)
}

/// Rounds to `digits` fractional digits. Values that already have no more
/// than `digits` are returned as they are, without expanding their exponent.
fn round(value: BigDecimal, digits: i64, mode: RoundingMode) -> BigDecimal {
    let (_, scale) = value.as_bigint_and_exponent();
    if scale <= digits {
        value
    } else {
        value.with_scale_round(digits, mode)
    }
}

fn mean(values: &[BigDecimal]) -> Result<BigDecimal, EvalError> {
    let total: BigDecimal = values.iter().sum();
    divide(total, BigDecimal::from(values.len() as u64))
}

fn sqrt(value: &BigDecimal) -> Result<BigDecimal, EvalError> {
    if value.is_negative() {
        return Err(EvalError::Domain(format!(
            "square root of negative number {value}"
        )));
    }
    value
        .sqrt()
        .ok_or_else(|| EvalError::Domain(format!("square root of {value} is undefined")))
}

fn integer(value: &BigDecimal, what: &str) -> Result<i64, EvalError> {
    if value.is_integer() {
        if let Some(integer) = value.to_i64() {
            return Ok(integer);
        }
    }
    Err(EvalError::Domain(format!(
        "{what} must be an integer but was {value}"
    )))
}

/// `values` is `[v, lower_1, upper_1, score_1, ...]`; returns the first score
/// whose half-open range `[lower, upper)` contains `v`, or zero.
fn score_table(values: &[BigDecimal]) -> BigDecimal {
    let (value, rows) = values.split_at(1);
    rows.chunks_exact(3)
        .find(|row| row[0] <= value[0] && value[0] < row[1])
        .map_or_else(BigDecimal::zero, |row| row[2].clone())
}
