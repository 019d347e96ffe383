//! Interpreter: [`Expr`] → [`Evaluable`].
//!
//! Compilation resolves function names and checks arities once, then builds
//! a tree of closures. The bindings are passed in at each evaluation rather
//! than captured, so an `Evaluable` holds no state between calls.

use std::{cmp::Ordering, fmt, str::FromStr};

use bigdecimal::BigDecimal;
use num_traits::{ToPrimitive, Zero};

use crate::{
    BinaryOp, Bindings, EvalError, Expr, Names, SyntaxError, UnaryOp, Value, functions::Function,
    types,
};

/// Exponents up to this magnitude are computed exactly.
const MAX_EXACT_EXPONENT: i64 = 1024;

pub(crate) type Thunk = Box<dyn Fn(&Bindings) -> Result<Value, EvalError> + Send + Sync>;

fn thunk<F>(f: F) -> Thunk
where
    F: Fn(&Bindings) -> Result<Value, EvalError> + Send + Sync + 'static,
{
    Box::new(f)
}

/// A compiled formula, ready to be evaluated against a set of bindings.
pub struct Evaluable {
    thunk: Thunk,
}

impl Evaluable {
    /// Creates an evaluable that always yields `value`.
    #[must_use]
    pub fn constant(value: Value) -> Self {
        Self {
            thunk: thunk(move |_| Ok(value.clone())),
        }
    }

    /// Evaluates the formula, reading referenced names from `bindings`.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced name is unbound, an operand has the
    /// wrong type, or an operation is undefined (such as division by zero).
    pub fn eval(&self, bindings: &Bindings) -> Result<Value, EvalError> {
        (self.thunk)(bindings)
    }
}

impl fmt::Debug for Evaluable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluable").finish_non_exhaustive()
    }
}

/// Compiles `ast` and records every variable it references in `names`, in
/// order of first appearance.
///
/// # Errors
///
/// Returns a [`SyntaxError`] for calls to unknown functions and for calls
/// with the wrong number of arguments.
pub fn apply(ast: &Expr, names: &mut Names) -> Result<Evaluable, SyntaxError> {
    let thunk = compile(ast, names)?;
    Ok(Evaluable { thunk })
}

fn compile(expr: &Expr, names: &mut Names) -> Result<Thunk, SyntaxError> {
    match expr {
        Expr::Number(text) => {
            let number = types::as_bigdecimal(text)
                .map_err(|_| SyntaxError::new(format!("invalid number `{text}`"), 0))?;
            Ok(Evaluable::constant(Value::Number(number)).thunk)
        }
        Expr::Bool(flag) => Ok(Evaluable::constant(Value::Bool(*flag)).thunk),
        Expr::Variable(name) => {
            names.insert(name);
            let name = name.clone();
            Ok(thunk(move |bindings| {
                bindings
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| EvalError::Unbound(name.clone()))
            }))
        }
        Expr::Unary { op, operand } => {
            let operand = compile(operand, names)?;
            let op = *op;
            Ok(thunk(move |bindings| unary(op, operand(bindings)?)))
        }
        Expr::Binary { op, lhs, rhs } => {
            let (lhs, rhs) = (compile(lhs, names)?, compile(rhs, names)?);
            let op = *op;
            Ok(thunk(move |bindings| binary(op, lhs(bindings)?, &rhs, bindings)))
        }
        Expr::Chain { first, rest } => {
            let first = compile(first, names)?;
            let rest = rest
                .iter()
                .map(|(op, operand)| Ok::<_, SyntaxError>((*op, compile(operand, names)?)))
                .collect::<Result<Vec<_>, SyntaxError>>()?;
            Ok(thunk(move |bindings| {
                rest.iter().try_fold(first(bindings)?, |lhs, (op, rhs)| {
                    binary(*op, lhs, rhs, bindings)
                })
            }))
        }
        Expr::Call {
            name,
            args,
            position,
        } => {
            let function = Function::lookup(name).ok_or_else(|| {
                SyntaxError::new(format!("unknown function `{name}`"), *position)
            })?;
            function
                .check_arity(args.len())
                .map_err(|expected| {
                    SyntaxError::new(
                        format!(
                            "`{}` expects {expected} but was given {}",
                            function.name(),
                            args.len()
                        ),
                        *position,
                    )
                })?;

            let args = args
                .iter()
                .map(|arg| compile(arg, names))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(thunk(move |bindings| function.call(&args, bindings)))
        }
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => Ok(Value::Number(-value.into_number()?)),
        UnaryOp::Plus => Ok(Value::Number(value.into_number()?)),
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
    }
}

/// Applies `op` to an evaluated left operand and the right operand's thunk.
///
/// The right operand is only evaluated when needed, so `and` and `or`
/// short-circuit.
fn binary(op: BinaryOp, lhs: Value, right: &Thunk, bindings: &Bindings) -> Result<Value, EvalError> {
    let rhs = || right(bindings);
    match op {
        BinaryOp::And => Ok(Value::Bool(lhs.is_truthy() && rhs()?.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(lhs.is_truthy() || rhs()?.is_truthy())),
        BinaryOp::Eq => equals(&lhs, &rhs()?).map(Value::Bool),
        BinaryOp::NotEq => equals(&lhs, &rhs()?).map(|eq| Value::Bool(!eq)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let rhs = rhs()?;
            let ordering = lhs.as_number()?.cmp(rhs.as_number()?);
            let result = match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => Ok(Value::Number(lhs.into_number()? + rhs()?.into_number()?)),
        BinaryOp::Sub => Ok(Value::Number(lhs.into_number()? - rhs()?.into_number()?)),
        BinaryOp::Mul => Ok(Value::Number(lhs.into_number()? * rhs()?.into_number()?)),
        BinaryOp::Div => divide(lhs.into_number()?, rhs()?.into_number()?).map(Value::Number),
        BinaryOp::Rem => {
            let (lhs, rhs) = (lhs.into_number()?, rhs()?.into_number()?);
            if rhs.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Number(lhs % rhs))
        }
        BinaryOp::Pow => {
            let rhs = rhs()?;
            power(lhs.as_number()?, rhs.as_number()?).map(Value::Number)
        }
    }
}

fn equals(lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
    match (lhs, rhs) {
        (Value::Number(lhs), Value::Number(rhs)) => Ok(lhs == rhs),
        (Value::Bool(lhs), Value::Bool(rhs)) => Ok(lhs == rhs),
        (Value::Number(_), Value::Bool(_)) => Err(EvalError::Type {
            expected: "a number",
            found: rhs.to_string(),
        }),
        (Value::Bool(_), Value::Number(_)) => Err(EvalError::Type {
            expected: "a boolean",
            found: rhs.to_string(),
        }),
    }
}

pub(crate) fn divide(lhs: BigDecimal, rhs: BigDecimal) -> Result<BigDecimal, EvalError> {
    if rhs.is_zero() {
        Err(EvalError::DivisionByZero)
    } else {
        Ok(lhs / rhs)
    }
}

fn power(base: &BigDecimal, exponent: &BigDecimal) -> Result<BigDecimal, EvalError> {
    if exponent.is_integer() {
        if let Some(n) = exponent.to_i64().filter(|n| n.abs() <= MAX_EXACT_EXPONENT) {
            let magnitude = integer_power(base, n.unsigned_abs());
            return if n < 0 {
                divide(BigDecimal::from(1), magnitude)
            } else {
                Ok(magnitude)
            };
        }
    }

    let (Some(base_f), Some(exponent_f)) = (base.to_f64(), exponent.to_f64()) else {
        return Err(EvalError::Domain(format!("{base} ^ {exponent} is out of range")));
    };
    from_f64(base_f.powf(exponent_f))
        .ok_or_else(|| EvalError::Domain(format!("{base} ^ {exponent} is not a real number")))
}

/// Exponentiation by squaring.
fn integer_power(base: &BigDecimal, mut n: u64) -> BigDecimal {
    let mut result = BigDecimal::from(1);
    let mut square = base.clone();
    while n > 0 {
        if n & 1 == 1 {
            result = &result * &square;
        }
        n >>= 1;
        if n > 0 {
            square = &square * &square;
        }
    }
    result
}

/// Converts a finite float through its shortest decimal representation.
pub(crate) fn from_f64(value: f64) -> Option<BigDecimal> {
    if value.is_finite() {
        BigDecimal::from_str(&value.to_string()).ok()
    } else {
        None
    }
}
