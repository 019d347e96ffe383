use hesabu_expr::{BigDecimal, Bindings, EvalError, Evaluable, Names, Value};

/// A registered equation: a name, its formula, and the text it came from.
#[derive(Debug)]
pub struct Equation {
    name: String,
    formula: Formula,
    raw_expression: String,
}

/// What an equation computes.
#[derive(Debug)]
pub enum Formula {
    /// A bare numeric literal.
    Constant(BigDecimal),
    /// A compiled expression and the names it reads, in order of first
    /// appearance.
    Computed {
        evaluable: Evaluable,
        dependencies: Names,
    },
}

impl Equation {
    pub(crate) fn new(name: String, formula: Formula, raw_expression: String) -> Self {
        Self {
            name,
            formula,
            raw_expression,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// The formula text as it was registered, carriage returns included.
    #[must_use]
    pub fn raw_expression(&self) -> &str {
        &self.raw_expression
    }

    /// Returns the names this equation reads, in the order they first
    /// appear in the formula.
    ///
    /// Constants have no dependencies.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        let dependencies = match &self.formula {
            Formula::Constant(_) => None,
            Formula::Computed { dependencies, .. } => Some(dependencies),
        };
        dependencies.into_iter().flat_map(|names| names.iter())
    }

    #[must_use]
    pub fn depends_on(&self, name: &str) -> bool {
        match &self.formula {
            Formula::Constant(_) => false,
            Formula::Computed { dependencies, .. } => dependencies.contains(name),
        }
    }

    /// Computes this equation's value from the values already in `bindings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the formula fails to evaluate.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<Value, EvalError> {
        match &self.formula {
            Formula::Constant(value) => Ok(Value::Number(value.clone())),
            Formula::Computed { evaluable, .. } => evaluable.eval(bindings),
        }
    }
}
