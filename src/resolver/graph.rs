//! Dependency graph for component install ordering.

use std::collections::{BTreeSet, HashMap};

use crate::error::{DevplanError, Result};

/// Dependency relationships between components.
///
/// Every node carries a rank (the index of the first requested profile that
/// declares it). Ties in the install order are broken by rank, then id.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Map of component id to its rank.
    ranks: HashMap<String, usize>,
    /// Map of component id to its direct dependencies.
    dependencies: HashMap<String, BTreeSet<String>>,
    /// Map of component id to components that depend on it.
    dependents: HashMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create a new dependency graph builder.
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::new()
    }

    /// Get the direct dependencies of a component.
    pub fn dependencies_of(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(id)
    }

    /// Get components that depend on the given component.
    pub fn dependents_of(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.dependents.get(id)
    }

    /// Check if a component exists in the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.ranks.contains_key(id)
    }

    /// Get the number of components in the graph.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    fn key<'a>(&self, id: &'a str) -> (usize, &'a str) {
        (self.ranks.get(id).copied().unwrap_or(usize::MAX), id)
    }

    /// Node ids sorted by (rank, id).
    fn ordered_nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = self.ranks.keys().map(|s| s.as_str()).collect();
        nodes.sort_by_key(|id| self.key(id));
        nodes
    }

    /// Direct dependencies of `id` sorted by (rank, id).
    fn ordered_dependencies(&self, id: &str) -> Vec<&str> {
        let mut deps: Vec<&str> = self
            .dependencies
            .get(id)
            .map(|d| d.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default();
        deps.sort_by_key(|dep| self.key(dep));
        deps
    }

    /// Returns components in install order (dependencies before dependents).
    ///
    /// Among components that are ready at the same time, the one with the
    /// lowest (rank, id) comes first, so the order is fully deterministic.
    /// Fails with [`DevplanError::CyclicDependency`] if a cycle exists.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        if let Some(cycle) = self.find_cycle() {
            return Err(DevplanError::CyclicDependency { cycle });
        }

        // Count incoming edges for each node
        let mut in_degree: HashMap<&str, usize> = self
            .ranks
            .keys()
            .map(|id| {
                let degree = self.dependencies.get(id).map_or(0, |d| d.len());
                (id.as_str(), degree)
            })
            .collect();

        // Start with nodes that have no dependencies
        let mut ready: BTreeSet<(usize, &str)> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(id, _)| self.key(id))
            .collect();

        let mut result = Vec::with_capacity(self.len());

        while let Some((rank, id)) = ready.pop_first() {
            result.push(id.to_string());

            // Reduce in-degree for all dependents
            if let Some(dependents) = self.dependents.get(id) {
                for dependent in dependents {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(self.key(dependent));
                        }
                    }
                }
            }
            tracing::trace!("Ordered {} (rank {})", id, rank);
        }

        Ok(result)
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// Nodes are visited in (rank, id) order. The path is in discovery order
    /// with its first node repeated at the end, e.g. `[a, b, a]`.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        let mut state: HashMap<&str, State> = self
            .ranks
            .keys()
            .map(|s| (s.as_str(), State::Unvisited))
            .collect();

        let mut path: Vec<&str> = Vec::new();

        fn dfs<'a>(
            node: &'a str,
            graph: &'a DependencyGraph,
            state: &mut HashMap<&'a str, State>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            state.insert(node, State::Visiting);
            path.push(node);

            for dep in graph.ordered_dependencies(node) {
                match state.get(dep) {
                    Some(State::Visiting) => {
                        // Back edge: the cycle starts where `dep` entered the path
                        let start = path.iter().position(|s| *s == dep).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|s| s.to_string()).collect();
                        cycle.push(dep.to_string());
                        return Some(cycle);
                    }
                    Some(State::Unvisited) | None => {
                        if let Some(cycle) = dfs(dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    Some(State::Visited) => {}
                }
            }

            path.pop();
            state.insert(node, State::Visited);
            None
        }

        for node in self.ordered_nodes() {
            if state.get(node) == Some(&State::Unvisited) {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}

/// Builder for constructing a DependencyGraph.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    ranks: HashMap<String, usize>,
    dependencies: HashMap<String, BTreeSet<String>>,
}

impl DependencyGraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component with its rank and dependencies.
    ///
    /// Adding the same id again keeps the lower rank and unions dependencies.
    pub fn add_node<I, S>(mut self, id: impl Into<String>, rank: usize, depends_on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let entry = self.ranks.entry(id.clone()).or_insert(rank);
        *entry = (*entry).min(rank);
        self.dependencies
            .entry(id)
            .or_default()
            .extend(depends_on.into_iter().map(Into::into));
        self
    }

    /// Build the dependency graph.
    ///
    /// Returns an error if any dependency references a component not in the graph.
    pub fn build(self) -> Result<DependencyGraph> {
        // Validate all dependencies exist
        for (id, deps) in &self.dependencies {
            for dep in deps {
                if !self.ranks.contains_key(dep) {
                    return Err(anyhow::anyhow!(
                        "Component '{}' depends on unknown component '{}'",
                        id,
                        dep
                    )
                    .into());
                }
            }
        }

        // Build dependents map (reverse lookup)
        let mut dependents: HashMap<String, BTreeSet<String>> = self
            .ranks
            .keys()
            .map(|id| (id.clone(), BTreeSet::new()))
            .collect();

        for (id, deps) in &self.dependencies {
            for dep in deps {
                if let Some(set) = dependents.get_mut(dep) {
                    set.insert(id.clone());
                }
            }
        }

        Ok(DependencyGraph {
            ranks: self.ranks,
            dependencies: self.dependencies,
            dependents,
        })
    }
}
