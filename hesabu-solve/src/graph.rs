use std::{collections::HashMap, hash::Hash, vec};

/// Errors that can occur during a topological sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortError<N, E> {
    /// The nodes form a cycle. Every member of the strongly connected
    /// component is listed, in the order the traversal first reached it.
    Cycle(Vec<N>),
    /// Enumerating a node's dependencies failed.
    Edge(E),
}

/// Orders `nodes` so that every node comes after all of its dependencies.
///
/// The sort is an iterative strongly connected component search (Tarjan's
/// algorithm). Roots are taken in the order `nodes` yields them and
/// dependencies in the order `dependencies` returns them, so the result is
/// deterministic for a given input.
///
/// `dependencies` is called exactly once per node, when the traversal first
/// reaches it. Nodes it returns do not need to appear in `nodes`.
///
/// A cycle is only reported once its whole component has been explored, so
/// an `Edge` error anywhere inside the component takes precedence.
///
/// # Errors
///
/// Returns [`SortError::Edge`] if `dependencies` fails, and
/// [`SortError::Cycle`] for the first component with more than one node or
/// with a node that depends on itself.
///
/// # Examples
///
/// ```
/// use std::{collections::HashMap, convert::Infallible};
///
/// use hesabu_solve::graph::topological_sort;
///
/// let edges = HashMap::from([("c", vec!["a", "b"]), ("b", vec!["a"]), ("a", vec![])]);
///
/// let order = topological_sort(["c", "b", "a"], |node| {
///     Ok::<_, Infallible>(edges[node].clone())
/// })
/// .unwrap();
///
/// assert_eq!(order, vec!["a", "b", "c"]);
/// ```
pub fn topological_sort<N, E, I, F>(nodes: I, mut dependencies: F) -> Result<Vec<N>, SortError<N, E>>
where
    N: Clone + Eq + Hash,
    I: IntoIterator<Item = N>,
    F: FnMut(&N) -> Result<Vec<N>, E>,
{
    let mut walk = Walk::default();

    for root in nodes {
        if walk.index.contains_key(&root) {
            continue;
        }
        let pending = dependencies(&root).map_err(SortError::Edge)?;
        walk.enter(root, pending);

        while let Some(frame) = walk.frames.last_mut() {
            let current = frame.node;

            let Some(next) = frame.pending.next() else {
                walk.leave().map_err(SortError::Cycle)?;
                continue;
            };

            match walk.index.get(&next).copied() {
                Some(seen) if seen == current => frame.self_loop = true,
                Some(seen) => {
                    if walk.on_stack[seen] {
                        walk.low[current] = walk.low[current].min(seen);
                    }
                }
                None => {
                    let pending = dependencies(&next).map_err(SortError::Edge)?;
                    walk.enter(next, pending);
                }
            }
        }
    }

    Ok(walk.order)
}

/// A node on the traversal path and its unvisited dependencies.
struct Frame<N> {
    node: usize,
    pending: vec::IntoIter<N>,
    self_loop: bool,
}

/// Traversal state. Nodes are identified by the order they were reached in.
struct Walk<N> {
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    /// Reached nodes whose component is not complete yet.
    stack: Vec<usize>,
    frames: Vec<Frame<N>>,
    order: Vec<N>,
}

impl<N> Default for Walk<N> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            low: Vec::new(),
            on_stack: Vec::new(),
            stack: Vec::new(),
            frames: Vec::new(),
            order: Vec::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> Walk<N> {
    fn enter(&mut self, node: N, pending: Vec<N>) {
        let id = self.nodes.len();
        self.index.insert(node.clone(), id);
        self.nodes.push(node);
        self.low.push(id);
        self.on_stack.push(true);
        self.stack.push(id);
        self.frames.push(Frame {
            node: id,
            pending: pending.into_iter(),
            self_loop: false,
        });
    }

    /// Pops the finished top frame, emitting its component if it is the root
    /// of one. A cyclic component is returned as the error.
    fn leave(&mut self) -> Result<(), Vec<N>> {
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        let id = frame.node;

        if let Some(parent) = self.frames.last() {
            self.low[parent.node] = self.low[parent.node].min(self.low[id]);
        }
        if self.low[id] != id {
            return Ok(());
        }

        let start = self.stack.iter().rposition(|&member| member == id).unwrap_or_default();
        let component = self.stack.split_off(start);
        for &member in &component {
            self.on_stack[member] = false;
        }

        if component.len() > 1 || frame.self_loop {
            let members = component.iter().map(|&member| self.nodes[member].clone());
            return Err(members.collect());
        }
        self.order.push(self.nodes[id].clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, convert::Infallible};

    use super::*;

    fn sort<'a>(
        nodes: &[&'a str],
        edges: &[(&'a str, &'a str)],
    ) -> Result<Vec<&'a str>, SortError<&'a str, Infallible>> {
        let mut map: HashMap<&str, Vec<&str>> = HashMap::new();
        for &(from, to) in edges {
            map.entry(from).or_default().push(to);
        }
        topological_sort(nodes.iter().copied(), |node| {
            Ok(map.get(node).cloned().unwrap_or_default())
        })
    }

    /// Like `sort`, but only `nodes` exist and any other name is an edge error.
    fn sort_strict<'a>(
        nodes: &[&'a str],
        edges: &[(&'a str, &'a str)],
    ) -> Result<Vec<&'a str>, SortError<&'a str, String>> {
        let mut map: HashMap<&str, Vec<&str>> = HashMap::new();
        for &(from, to) in edges {
            map.entry(from).or_default().push(to);
        }
        topological_sort(nodes.iter().copied(), |node| {
            if nodes.contains(node) {
                Ok(map.get(node).cloned().unwrap_or_default())
            } else {
                Err(format!("no node {node}"))
            }
        })
    }

    #[test]
    fn independent_nodes_keep_input_order() {
        assert_eq!(sort(&["b", "c", "a"], &[]).unwrap(), vec!["b", "c", "a"]);
    }

    #[test]
    fn dependencies_come_first() {
        let order = sort(&["d", "c", "b", "a"], &[("d", "b"), ("d", "c"), ("b", "a"), ("c", "a")]);
        assert_eq!(order.unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn dependencies_follow_the_given_order() {
        let order = sort(&["d", "c", "b"], &[("d", "c"), ("d", "b")]);
        assert_eq!(order.unwrap(), vec!["c", "b", "d"]);
    }

    #[test]
    fn each_node_appears_once() {
        let order = sort(&["a", "b", "a"], &[("b", "a")]).unwrap();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn long_chains_do_not_recurse() {
        let names: Vec<String> = (0..100_000).map(|i| format!("x{i}")).collect();
        let order = topological_sort(names.iter().rev().cloned(), |node: &String| {
            let index: usize = node[1..].parse().unwrap();
            Ok::<_, Infallible>(if index == 0 {
                vec![]
            } else {
                vec![format!("x{}", index - 1)]
            })
        })
        .unwrap();
        assert_eq!(order, names);
    }

    #[test]
    fn reports_cycle_members_in_traversal_order() {
        let error = sort(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "b")]).unwrap_err();
        assert_eq!(error, SortError::Cycle(vec!["b", "c"]));

        let error = sort(&["a", "b"], &[("a", "b"), ("b", "a")]).unwrap_err();
        assert_eq!(error, SortError::Cycle(vec!["a", "b"]));
    }

    #[test]
    fn cycle_lists_the_whole_component() {
        let edges = [("a", "b"), ("a", "c"), ("b", "a"), ("c", "a")];
        let error = sort(&["a", "b", "c"], &edges).unwrap_err();
        assert_eq!(error, SortError::Cycle(vec!["a", "b", "c"]));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let error = sort(&["a"], &[("a", "a")]).unwrap_err();
        assert_eq!(error, SortError::Cycle(vec!["a"]));
    }

    #[test]
    fn edge_errors_abort_the_sort() {
        let result = sort_strict(&["a", "b"], &[("a", "b"), ("a", "missing")]);
        assert_eq!(result, Err(SortError::Edge("no node missing".to_string())));
    }

    #[test]
    fn edge_errors_inside_a_cycle_win() {
        let result = sort_strict(&["x", "y"], &[("x", "y"), ("x", "z"), ("y", "x")]);
        assert_eq!(result, Err(SortError::Edge("no node z".to_string())));

        let result = sort_strict(&["a"], &[("a", "a"), ("a", "missing")]);
        assert_eq!(result, Err(SortError::Edge("no node missing".to_string())));
    }

    #[test]
    fn dependencies_are_enumerated_once_per_node() {
        let mut calls = HashMap::new();
        topological_sort(["a", "b", "c"], |node| {
            *calls.entry(*node).or_insert(0) += 1;
            Ok::<_, Infallible>(match *node {
                "b" | "c" => vec!["a"],
                _ => vec![],
            })
        })
        .unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.values().all(|&count| count == 1));
    }
}
