use thiserror::Error;

/// A formula that could not be parsed or compiled.
///
/// `position` is the byte offset into the formula text where the problem
/// was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Errors that can occur while evaluating a compiled formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A referenced name has no value in the bindings.
    #[error("unbound variable {0}")]
    Unbound(String),

    #[error("expected {expected} but found {found}")]
    Type {
        expected: &'static str,
        found: String,
    },

    #[error("divided by 0")]
    DivisionByZero,

    /// The operation is undefined for its arguments.
    #[error("{0}")]
    Domain(String),
}
