/// Configuration for a [`Solver`](crate::Solver).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Emits each cleaned expression and a JSON dump of its parsed tree at
    /// debug level when an equation is added. Solving is unaffected.
    pub debug: bool,
}

impl Config {
    /// Returns a copy of this config with the debug trace switched on or off.
    #[must_use]
    pub fn with_debug(self, debug: bool) -> Self {
        Self { debug, ..self }
    }
}
