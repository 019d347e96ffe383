//! Formula language for Hesabu.
//!
//! This crate turns raw formula text into deferred computations that the
//! solver can order and evaluate:
//!
//! - [`types`]: recognizes bare numeric literals and converts them to
//!   arbitrary-precision decimals
//! - [`parse`]: parses formula text into an [`Expr`] tree
//! - [`apply`]: compiles an [`Expr`] into an [`Evaluable`] and collects the
//!   names it references, in order of first appearance
//! - [`Bindings`]: the name-to-value environment an [`Evaluable`] reads from
//!
//! # Example
//!
//! ```
//! use hesabu_expr::{Bindings, Names, Value, apply, parse};
//!
//! let ast = parse("IF(a > 1, a * 2, 0)").unwrap();
//! let mut names = Names::new();
//! let evaluable = apply(&ast, &mut names).unwrap();
//! assert!(names.contains("a"));
//!
//! let mut bindings = Bindings::new();
//! bindings.insert("a", Value::from(3));
//! assert_eq!(evaluable.eval(&bindings).unwrap(), Value::from(6));
//! ```

mod ast;
mod bindings;
mod error;
mod functions;
mod interpret;
mod lexer;
mod names;
mod parser;
mod value;

pub mod types;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use bigdecimal::BigDecimal;
pub use bindings::Bindings;
pub use error::{EvalError, SyntaxError};
pub use interpret::{Evaluable, apply};
pub use names::Names;
pub use parser::parse;
pub use value::Value;
