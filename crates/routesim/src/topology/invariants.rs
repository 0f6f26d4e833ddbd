//! Topological Invariants - Rules that must always hold true
//!
//! The graph maintains these itself; the checker exists to verify that
//! claim in tests and to let callers audit a graph on demand.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::graph::TopologyGraph;

/// A violation of a topological invariant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvariantViolation {
    pub invariant_name: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub affected_nodes: Vec<String>,
    pub suggested_fix: Option<String>,
}

/// Severity levels for invariant violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Informational - doesn't break anything but worth noting
    Info,
    /// Warning - could cause issues, should be addressed
    Warning,
    /// Error - violates a required invariant, needs immediate attention
    Error,
    /// Critical - system is in an invalid state
    Critical,
}

/// Invariant checker for topology validation
pub struct InvariantChecker {
    /// Enable strict mode (all warnings become errors)
    strict_mode: bool,
}

impl Default for InvariantChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantChecker {
    pub fn new() -> Self {
        Self { strict_mode: false }
    }

    /// Enable strict mode
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Check all invariants against a topology graph
    pub fn check_all(&self, graph: &TopologyGraph) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        violations.extend(self.check_no_dangling_edges(graph));
        violations.extend(self.check_no_self_loops(graph));
        violations.extend(self.check_no_duplicate_edges(graph));
        violations.extend(self.check_link_symmetry(graph));
        violations.extend(self.check_edge_weight_validity(graph));

        if self.strict_mode {
            for v in &mut violations {
                if v.severity == ViolationSeverity::Warning {
                    v.severity = ViolationSeverity::Error;
                }
            }
        }

        if !violations.is_empty() {
            tracing::warn!(count = violations.len(), "topology invariant violations found");
        }

        violations
    }

    /// Check that every edge and adjacency entry references an existing node
    fn check_no_dangling_edges(&self, graph: &TopologyGraph) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for (owner, edges) in &graph.adjacency {
            if !graph.nodes.contains_key(owner) {
                violations.push(InvariantViolation {
                    invariant_name: "no_dangling_edges".to_string(),
                    severity: ViolationSeverity::Critical,
                    message: format!("Adjacency list kept for removed node {}", owner),
                    affected_nodes: vec![owner.clone()],
                    suggested_fix: Some("Drop the adjacency entry".to_string()),
                });
            }

            for edge in edges {
                let mut missing: Vec<String> = [&edge.from, &edge.to]
                    .into_iter()
                    .filter(|id| !graph.nodes.contains_key(id.as_str()))
                    .cloned()
                    .collect();
                if edge.from != *owner {
                    missing.push(owner.clone());
                }

                if !missing.is_empty() {
                    violations.push(InvariantViolation {
                        invariant_name: "no_dangling_edges".to_string(),
                        severity: ViolationSeverity::Error,
                        message: format!(
                            "Edge {} -> {} in the list of {} references missing or foreign nodes: {:?}",
                            edge.from, edge.to, owner, missing
                        ),
                        affected_nodes: missing,
                        suggested_fix: Some("Remove the edge or create the missing nodes".to_string()),
                    });
                }
            }
        }

        for id in graph.nodes.keys() {
            if !graph.adjacency.contains_key(id) {
                violations.push(InvariantViolation {
                    invariant_name: "no_dangling_edges".to_string(),
                    severity: ViolationSeverity::Error,
                    message: format!("Node {} has no adjacency entry", id),
                    affected_nodes: vec![id.clone()],
                    suggested_fix: Some("Insert an empty adjacency list".to_string()),
                });
            }
        }

        violations
    }

    /// Check for self-referential edges
    fn check_no_self_loops(&self, graph: &TopologyGraph) -> Vec<InvariantViolation> {
        graph
            .adjacency
            .values()
            .flatten()
            .filter(|e| e.from == e.to)
            .map(|e| InvariantViolation {
                invariant_name: "no_self_loops".to_string(),
                severity: ViolationSeverity::Warning,
                message: format!("Node {} has a self-loop", e.from),
                affected_nodes: vec![e.from.clone()],
                suggested_fix: Some("Remove the self-referential edge".to_string()),
            })
            .collect()
    }

    /// Check that no adjacency list holds the same (from, to) pair twice
    fn check_no_duplicate_edges(&self, graph: &TopologyGraph) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for edges in graph.adjacency.values() {
            let mut seen = HashSet::new();
            for edge in edges {
                if !seen.insert((&edge.from, &edge.to)) {
                    violations.push(InvariantViolation {
                        invariant_name: "no_duplicate_edges".to_string(),
                        severity: ViolationSeverity::Error,
                        message: format!("Edge {} -> {} is stored twice", edge.from, edge.to),
                        affected_nodes: vec![edge.from.clone(), edge.to.clone()],
                        suggested_fix: Some("Keep a single record and re-weight it".to_string()),
                    });
                }
            }
        }

        violations
    }

    /// Check that every A -> B record has a B -> A twin with the same weight
    fn check_link_symmetry(&self, graph: &TopologyGraph) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for edge in graph.adjacency.values().flatten() {
            match graph.find_edge(&edge.to, &edge.from) {
                None => violations.push(InvariantViolation {
                    invariant_name: "link_symmetry".to_string(),
                    severity: ViolationSeverity::Error,
                    message: format!(
                        "Edge {} -> {} has no reverse record",
                        edge.from, edge.to
                    ),
                    affected_nodes: vec![edge.from.clone(), edge.to.clone()],
                    suggested_fix: Some("Re-add the link so both directions exist".to_string()),
                }),
                Some(reverse) if reverse.weight != edge.weight => {
                    violations.push(InvariantViolation {
                        invariant_name: "link_symmetry".to_string(),
                        severity: ViolationSeverity::Error,
                        message: format!(
                            "Edge {} -> {} has weight {} but its reverse has {}",
                            edge.from, edge.to, edge.weight, reverse.weight
                        ),
                        affected_nodes: vec![edge.from.clone(), edge.to.clone()],
                        suggested_fix: Some("Re-add the link with a single weight".to_string()),
                    })
                }
                Some(_) => {}
            }
        }

        violations
    }

    /// Check that edge weights are usable by the weighted search
    fn check_edge_weight_validity(&self, graph: &TopologyGraph) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for edge in graph.adjacency.values().flatten() {
            if !edge.weight.is_finite() {
                violations.push(InvariantViolation {
                    invariant_name: "finite_edge_weights".to_string(),
                    severity: ViolationSeverity::Critical,
                    message: format!(
                        "Edge {} -> {} has non-finite weight: {}",
                        edge.from, edge.to, edge.weight
                    ),
                    affected_nodes: vec![edge.from.clone(), edge.to.clone()],
                    suggested_fix: Some("Set a finite weight".to_string()),
                });
            } else if edge.weight < 0.0 {
                violations.push(InvariantViolation {
                    invariant_name: "non_negative_edge_weights".to_string(),
                    severity: ViolationSeverity::Warning,
                    message: format!(
                        "Edge {} -> {} has negative weight: {}; weighted routes may not be minimal",
                        edge.from, edge.to, edge.weight
                    ),
                    affected_nodes: vec![edge.from.clone(), edge.to.clone()],
                    suggested_fix: Some("Set weight to a non-negative value".to_string()),
                });
            }
        }

        violations
    }
}
