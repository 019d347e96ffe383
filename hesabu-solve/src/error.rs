use std::{error::Error as StdError, fmt};

use hesabu_expr::{EvalError, SyntaxError};
use thiserror::Error;

/// Errors raised while registering or solving equations.
///
/// Every variant carries enough context to locate the offending formula
/// without re-parsing it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// `add` was called without a name or without an expression.
    #[error(
        "name or expression can't be missing : '{}', '{}'",
        or_empty(.name),
        or_empty(.expression)
    )]
    InvalidInput {
        name: Option<String>,
        expression: Option<String>,
    },

    /// The formula text could not be parsed or compiled.
    #[error("failed to parse {name} := {expression} : {source}")]
    Parse {
        name: String,
        expression: String,
        source: SyntaxError,
    },

    /// The equations reference each other in a loop.
    #[error("There's a cycle between the variables : {names:?}")]
    Cycle { names: Vec<String> },

    /// An equation depends on a name that was never registered.
    #[error("Unbound variable : {name} used by {used_by} ({expression})")]
    UnboundVariable {
        name: String,
        used_by: String,
        expression: String,
    },

    /// Evaluating an equation failed.
    #[error("Failed to evaluate {name} due to {source} in formula {expression}")]
    Evaluation {
        name: String,
        expression: String,
        source: EvalError,
    },
}

/// The kind of an [`Error`], without its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Parse,
    Cycle,
    UnboundVariable,
    Evaluation,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Cycle { .. } => ErrorKind::Cycle,
            Error::UnboundVariable { .. } => ErrorKind::UnboundVariable,
            Error::Evaluation { .. } => ErrorKind::Evaluation,
        }
    }

    /// Logs the error with its kind and cause chain, then returns it.
    pub(crate) fn logged(self) -> Self {
        let mut causes = Vec::new();
        let mut source = self.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        tracing::error!(kind = %self.kind(), ?causes, "{self}");
        self
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Parse => "parse",
            ErrorKind::Cycle => "cycle",
            ErrorKind::UnboundVariable => "unbound variable",
            ErrorKind::Evaluation => "evaluation",
        };
        f.write_str(name)
    }
}

fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}
