//! Dependency-ordered solver for named equations.
//!
//! Equations are registered by name with formula text that may reference
//! other equations. The solver builds the dependency graph, orders it,
//! evaluates each equation once, and returns every value:
//!
//! - [`Solver`]: the equation registry and evaluation engine
//! - [`graph::topological_sort`]: the reusable ordering algorithm
//! - [`Error`]: every way registration or solving can fail, with the
//!   offending equation attached
//!
//! Errors are logged through `tracing` before they are returned.

mod config;
mod equation;
mod error;
mod solver;

pub mod graph;

pub use config::Config;
pub use equation::{Equation, Formula};
pub use error::{Error, ErrorKind};
pub use hesabu_expr::{BigDecimal, Value};
pub use solver::{Solution, Solver};
