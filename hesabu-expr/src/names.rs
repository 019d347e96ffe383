use std::collections::HashSet;

/// The variable names a formula reads, in order of first appearance.
///
/// Repeated names are kept once, at the position they first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl Names {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name`, returning `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_owned());
        self.order.push(name.to_owned());
        true
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_appearance_order() {
        let mut names = Names::new();
        assert!(names.insert("z"));
        assert!(names.insert("a"));
        assert!(!names.insert("z"));

        assert_eq!(names.iter().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(names.len(), 2);
        assert!(names.contains("a"));
        assert!(!names.contains("b"));
    }
}
