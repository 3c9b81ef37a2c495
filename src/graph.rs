//! Which paths need revalidating when another path changes.

use crate::rule::RuleChain;
use indexmap::{IndexMap, IndexSet};

/// Symmetric adjacency between declared paths and the paths their rules
/// reference with `@`.
///
/// References are recorded as written: wildcards are not resolved, so a rule
/// on `jobs.*.end_date` referencing `@jobs.*.current` links those two
/// patterns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    adjacent: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// One edge per (declared path, referenced path) pair.
    pub fn build<'a, I>(chains: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a RuleChain)>,
    {
        let mut graph = Self::new();
        for (path, chain) in chains {
            for reference in chain.references() {
                graph.link(path, reference);
            }
        }
        graph
    }

    /// Records `a` and `b` as adjacent to each other.
    pub fn link(&mut self, a: &str, b: &str) {
        self.adjacent
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
        self.adjacent
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
    }

    /// Paths adjacent to `path`, in the order they were linked.
    pub fn dependents(&self, path: &str) -> Vec<String> {
        self.adjacent
            .get(path)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        let directed: usize = self.adjacent.values().map(IndexSet::len).sum();
        let self_loops = self
            .adjacent
            .iter()
            .filter(|(path, set)| set.contains(*path))
            .count();
        (directed + self_loops) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.adjacent.is_empty()
    }
}
