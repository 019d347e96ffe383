use std::collections::BTreeMap;

use crate::Value;

/// The environment that maps equation names to computed values.
///
/// A solver owns a single `Bindings` and fills it in dependency order, so
/// each [`Evaluable`](crate::Evaluable) can read the values of the names it
/// depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, Value>,
}

impl Bindings {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Binds `name` to `value`, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns every binding and leaves the environment empty.
    pub fn take(&mut self) -> BTreeMap<String, Value> {
        std::mem::take(&mut self.values)
    }
}
