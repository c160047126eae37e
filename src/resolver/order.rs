//! Build order across addons.
//!
//! Dependents link against the library manifests of the addons they
//! require, so those addons must be built first. Nothing enforces this at
//! build time; this graph computes an order a caller can follow.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use semver::{Version, VersionReq};

use crate::core::addon::AddonDescriptor;
use crate::core::errors::BuildError;

/// The `require` graph of a set of addons.
#[derive(Debug)]
pub struct AddonGraph<'a> {
    /// Edge a -> b means "b requires a" (a builds first)
    graph: DiGraph<&'a AddonDescriptor, ()>,

    /// Lowercased key -> node
    key_to_node: HashMap<String, NodeIndex>,

    /// Requirement problems found while building the graph
    warnings: Vec<String>,
}

impl<'a> AddonGraph<'a> {
    /// Build the graph. Requirements on addons outside the set are ignored.
    pub fn new(addons: &'a [AddonDescriptor]) -> Self {
        let mut graph = DiGraph::new();
        let mut key_to_node = HashMap::new();

        for addon in addons {
            let node = graph.add_node(addon);
            key_to_node.insert(addon.key.to_lowercase(), node);
        }

        let mut warnings = Vec::new();
        for addon in addons {
            let dependent = key_to_node[&addon.key.to_lowercase()];
            for (required_key, requirement) in &addon.require {
                let Some(&dependency) = key_to_node.get(&required_key.to_lowercase()) else {
                    tracing::debug!(
                        "`{}` requires `{}`, which is not part of this build",
                        addon.key,
                        required_key
                    );
                    continue;
                };
                if dependency == dependent {
                    continue;
                }
                if let Some(warning) = check_requirement(addon, graph[dependency], requirement) {
                    warnings.push(warning);
                }
                if !graph.contains_edge(dependency, dependent) {
                    graph.add_edge(dependency, dependent, ());
                }
            }
        }

        AddonGraph {
            graph,
            key_to_node,
            warnings,
        }
    }

    /// Addons in build order (required addons before their dependents).
    pub fn build_order(&self) -> Result<Vec<&'a AddonDescriptor>, BuildError> {
        match toposort(&self.graph, None) {
            Ok(nodes) => Ok(nodes.into_iter().map(|n| self.graph[n]).collect()),
            Err(cycle) => {
                let start = cycle.node_id();
                Err(BuildError::DependencyCycle {
                    addons: self.cycle_through(start),
                })
            }
        }
    }

    /// Keys of the addons `key` requires directly.
    pub fn requirements(&self, key: &str) -> Vec<&str> {
        match self.key_to_node.get(&key.to_lowercase()) {
            Some(&node) => self
                .graph
                .neighbors_directed(node, petgraph::Direction::Incoming)
                .map(|n| self.graph[n].key.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Version requirement problems.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Walk requirements from `start` until a node repeats.
    fn cycle_through(&self, start: NodeIndex) -> Vec<String> {
        let mut path = vec![start];
        let mut current = start;
        loop {
            let next = self
                .graph
                .neighbors_directed(current, petgraph::Direction::Incoming)
                .next();
            match next {
                Some(node) if path.contains(&node) => {
                    let first = path.iter().position(|n| *n == node).unwrap_or(0);
                    let mut keys: Vec<String> = path[first..]
                        .iter()
                        .map(|n| self.graph[*n].key.clone())
                        .collect();
                    keys.push(self.graph[node].key.clone());
                    return keys;
                }
                Some(node) => {
                    path.push(node);
                    current = node;
                }
                None => return path.iter().map(|n| self.graph[*n].key.clone()).collect(),
            }
        }
    }
}

/// Check a `require` constraint against the required addon's declared version.
fn check_requirement(
    dependent: &AddonDescriptor,
    dependency: &AddonDescriptor,
    requirement: &str,
) -> Option<String> {
    let version = dependency.version.as_deref()?;
    let (Ok(req), Ok(version)) = (VersionReq::parse(requirement), Version::parse(version)) else {
        tracing::debug!(
            "cannot compare `{}` against {} {}",
            requirement,
            dependency.key,
            version
        );
        return None;
    };

    if req.matches(&version) {
        None
    } else {
        Some(format!(
            "`{}` requires {} {}, but {} is installed",
            dependent.key, dependency.key, req, version
        ))
    }
}
