use std::collections::{BTreeMap, HashMap};

use hesabu_expr::{Bindings, Names, Value, apply, parse, types};
use tracing::debug;

use crate::{
    Config, Error,
    equation::{Equation, Formula},
    graph::{SortError, topological_sort},
};

/// A solved set of equations, keyed by name.
pub type Solution = BTreeMap<String, Value>;

/// Registers named equations and solves them in dependency order.
///
/// Equations may reference each other by name. [`Solver::solve`] works out
/// an evaluation order, evaluates every equation once, and returns all the
/// values together.
///
/// # Examples
///
/// ```
/// use hesabu_solve::{Solver, Value};
///
/// let mut solver = Solver::new();
/// solver.add("total", "price * quantity").unwrap();
/// solver.add("price", "2.5").unwrap();
/// solver.add("quantity", "4").unwrap();
///
/// let solution = solver.solve().unwrap();
/// assert_eq!(solution["total"], Value::from(10));
/// ```
#[derive(Debug, Default)]
pub struct Solver {
    config: Config,
    /// Equations in registration order.
    equations: Vec<Equation>,
    /// Position of each equation in `equations`.
    index: HashMap<String, usize>,
    bindings: Bindings,
}

impl Solver {
    /// Creates a solver with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers an equation, replacing any previous equation with the same name.
    ///
    /// A bare numeric literal is stored as a constant. Anything else has its
    /// carriage returns stripped and is parsed and compiled immediately, so
    /// malformed formulas are reported here rather than at solve time.
    ///
    /// A replaced equation keeps its original position in registration order.
    ///
    /// # Arguments
    ///
    /// * `name` - The equation name, or `None` if it is missing.
    /// * `raw_expression` - The formula text, or `None` if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either argument is `None`, and
    /// [`Error::Parse`] if the formula cannot be parsed or compiled. The
    /// solver is left unchanged on error.
    pub fn add<'a>(
        &mut self,
        name: impl Into<Option<&'a str>>,
        raw_expression: impl Into<Option<&'a str>>,
    ) -> Result<(), Error> {
        let (name, raw_expression) = (name.into(), raw_expression.into());
        let (Some(name), Some(raw_expression)) = (name, raw_expression) else {
            return Err(Error::InvalidInput {
                name: name.map(str::to_owned),
                expression: raw_expression.map(str::to_owned),
            }
            .logged());
        };

        let formula = self.compile(name, raw_expression).map_err(Error::logged)?;
        let equation = Equation::new(name.to_owned(), formula, raw_expression.to_owned());

        match self.index.get(name) {
            Some(&position) => self.equations[position] = equation,
            None => {
                self.index.insert(name.to_owned(), self.equations.len());
                self.equations.push(equation);
            }
        }
        Ok(())
    }

    /// Returns every equation name in an order that evaluates dependencies first.
    ///
    /// Names that are not constrained by a dependency keep their registration
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnboundVariable`] if an equation depends on a name
    /// that was never registered, and [`Error::Cycle`] if equations depend on
    /// each other in a loop.
    pub fn solving_order(&self) -> Result<Vec<String>, Error> {
        self.order().map_err(Error::logged)
    }

    /// Evaluates every equation and returns the solution.
    ///
    /// Equations are evaluated in [`solving_order`](Self::solving_order),
    /// each one reading the values computed before it. Numbers in the
    /// solution are normalized, so `2.50` is reported as `2.5`.
    ///
    /// Registered equations are kept, so solving again gives the same result.
    ///
    /// # Errors
    ///
    /// Returns the ordering errors of [`solving_order`](Self::solving_order),
    /// or [`Error::Evaluation`] for the first equation that fails to
    /// evaluate. No partial solution is returned.
    pub fn solve(&mut self) -> Result<Solution, Error> {
        let result = self.evaluate_all();
        let snapshot = self.bindings.take();

        match result {
            Ok(()) => Ok(finalize(snapshot)),
            Err(error) => Err(error.logged()),
        }
    }

    /// Looks up a registered equation by name.
    #[must_use]
    pub fn equation(&self, name: &str) -> Option<&Equation> {
        self.index
            .get(name)
            .map(|&position| &self.equations[position])
    }

    /// Returns the registered equations in registration order.
    pub fn equations(&self) -> impl Iterator<Item = &Equation> {
        self.equations.iter()
    }

    /// Returns the registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.equations.iter().map(Equation::name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.equations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    fn compile(&self, name: &str, raw_expression: &str) -> Result<Formula, Error> {
        if let Some(value) = types::as_numeric(raw_expression) {
            return Ok(Formula::Constant(value));
        }

        let expression = raw_expression.replace("\r\n", "").replace('\r', "");
        let parse_error = |source| Error::Parse {
            name: name.to_owned(),
            expression: expression.clone(),
            source,
        };

        let ast = parse(&expression).map_err(|source| {
            debug!(name, raw_expression, "formula failed to parse");
            parse_error(source)
        })?;

        if self.config.debug {
            let dump = serde_json::to_string_pretty(&ast)
                .unwrap_or_else(|error| format!("<unavailable: {error}>"));
            debug!(target: "hesabu_solve::debug", name, %expression, ast = %dump);
        }

        let mut dependencies = Names::new();
        let evaluable = apply(&ast, &mut dependencies).map_err(parse_error)?;

        Ok(Formula::Computed {
            evaluable,
            dependencies,
        })
    }

    fn order(&self) -> Result<Vec<String>, Error> {
        let order = topological_sort(self.names(), |&name| match self.equation(name) {
            Some(equation) => Ok(equation.dependencies().collect()),
            None => Err(self.unbound(name)),
        })
        .map_err(|error| match error {
            SortError::Cycle(names) => Error::Cycle {
                names: names.into_iter().map(str::to_owned).collect(),
            },
            SortError::Edge(error) => error,
        })?;

        Ok(order.into_iter().map(str::to_owned).collect())
    }

    /// Describes a missing name using the first equation that references it.
    fn unbound(&self, name: &str) -> Error {
        let used_by = self
            .equations
            .iter()
            .find(|equation| equation.depends_on(name));

        Error::UnboundVariable {
            name: name.to_owned(),
            used_by: used_by.map(|e| e.name().to_owned()).unwrap_or_default(),
            expression: used_by
                .map(|e| e.raw_expression().to_owned())
                .unwrap_or_default(),
        }
    }

    fn evaluate_all(&mut self) -> Result<(), Error> {
        let order = self.order()?;
        debug!(equations = order.len(), "solving");
        self.evaluate_in(order)
    }

    /// Evaluates the named equations in the given order.
    ///
    /// Every name must be registered. A name that is not is reported as
    /// unbound rather than skipped, so no solution can miss a value.
    fn evaluate_in(&mut self, order: Vec<String>) -> Result<(), Error> {
        for name in order {
            let Some(equation) = self.equation(&name) else {
                return Err(self.unbound(&name));
            };

            let value = equation
                .evaluate(&self.bindings)
                .map_err(|source| Error::Evaluation {
                    name: name.clone(),
                    expression: equation.raw_expression().to_owned(),
                    source,
                })?;

            debug!(%name, %value, "evaluated");
            self.bindings.insert(name, value);
        }
        Ok(())
    }
}

/// Normalizes every value in a snapshot of the bindings.
fn finalize(snapshot: BTreeMap<String, Value>) -> Solution {
    snapshot
        .into_iter()
        .map(|(name, value)| (name, types::normalize(value)))
        .collect()
}
