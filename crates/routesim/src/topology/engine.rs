//! Topology engine - hop-count and weighted pathfinding

use super::graph::TopologyGraph;
use crate::{Result, RouteSimError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

/// How a route is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingMode {
    /// Fewest links traversed, weights ignored
    #[default]
    HopCount,
    /// Smallest sum of link weights
    Weighted,
}

impl fmt::Display for WeightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HopCount => write!(f, "hop_count"),
            Self::Weighted => write!(f, "weighted"),
        }
    }
}

impl FromStr for WeightingMode {
    type Err = RouteSimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hop" | "hops" | "hop_count" | "hop-count" | "bfs" => Ok(Self::HopCount),
            "weight" | "weighted" | "cost" | "dijkstra" => Ok(Self::Weighted),
            other => Err(RouteSimError::ConfigError(format!(
                "unknown weighting mode '{}' (expected 'hop' or 'weighted')",
                other
            ))),
        }
    }
}

/// A path through the topology, source first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub nodes: Vec<String>,
    pub total_weight: f64,
}

impl Path {
    pub fn single(node: impl Into<String>) -> Self {
        Self {
            nodes: vec![node.into()],
            total_weight: 0.0,
        }
    }

    /// Number of links traversed
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn source(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    pub fn destination(&self) -> Option<&str> {
        self.nodes.last().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes.join(" → "))
    }
}

/// Result of a route query. "No path" is an ordinary answer, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteOutcome {
    Found(Path),
    NoPath { from: String, to: String },
}

impl RouteOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::NoPath { .. } => None,
        }
    }
}

/// Heap entry for Dijkstra's algorithm
#[derive(Clone, PartialEq)]
struct DijkstraState<'a> {
    cost: f64,
    seq: usize,
    node_id: &'a str,
}

impl Eq for DijkstraState<'_> {}

impl Ord for DijkstraState<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; FIFO among equal costs
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for DijkstraState<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Stateless pathfinding over a [`TopologyGraph`]
pub struct TopologyEngine;

impl TopologyEngine {
    /// Dispatch to the algorithm selected by `mode`
    pub fn find_route(
        graph: &TopologyGraph,
        from: &str,
        to: &str,
        mode: WeightingMode,
    ) -> Result<RouteOutcome> {
        tracing::debug!(from, to, %mode, "finding route");
        match mode {
            WeightingMode::HopCount => Self::find_hop_path(graph, from, to),
            WeightingMode::Weighted => Self::find_weighted_path(graph, from, to),
        }
    }

    /// Breadth-first search for the path with the fewest links.
    ///
    /// Among several minimum-hop paths the one found first in adjacency
    /// insertion order wins.
    pub fn find_hop_path(graph: &TopologyGraph, from: &str, to: &str) -> Result<RouteOutcome> {
        Self::ensure_endpoints(graph, from, to)?;

        let mut prev: HashMap<&str, &str> = HashMap::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::new();

        queue.push_back(from);
        visited.insert(from);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let nodes = Self::reconstruct(&prev, from, to);
                let total_weight = Self::path_weight(graph, &nodes).unwrap_or(0.0);
                return Ok(RouteOutcome::Found(Path {
                    nodes,
                    total_weight,
                }));
            }

            for edge in graph.edges_from(current) {
                let neighbor = edge.to.as_str();
                if visited.insert(neighbor) {
                    prev.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(Self::no_path(from, to))
    }

    /// Dijkstra's algorithm for the path with the smallest total weight.
    ///
    /// Nodes are re-inserted on relaxation instead of decreasing their key;
    /// stale heap entries are skipped when popped. Requires non-negative
    /// weights, which the graph enforces unless configured otherwise.
    pub fn find_weighted_path(
        graph: &TopologyGraph,
        from: &str,
        to: &str,
    ) -> Result<RouteOutcome> {
        Self::ensure_endpoints(graph, from, to)?;

        let mut dist: HashMap<&str, f64> = HashMap::new();
        let mut prev: HashMap<&str, &str> = HashMap::new();
        let mut done: HashSet<&str> = HashSet::new();
        let mut heap = BinaryHeap::new();
        let mut seq = 0usize;

        dist.insert(from, 0.0);
        heap.push(DijkstraState {
            cost: 0.0,
            seq,
            node_id: from,
        });

        while let Some(DijkstraState { cost, node_id, .. }) = heap.pop() {
            if node_id == to {
                return Ok(RouteOutcome::Found(Path {
                    nodes: Self::reconstruct(&prev, from, to),
                    total_weight: cost,
                }));
            }

            if dist.get(node_id).is_some_and(|&known| cost > known) {
                continue;
            }
            if !done.insert(node_id) {
                continue;
            }

            for edge in graph.edges_from(node_id) {
                let next = edge.to.as_str();
                if done.contains(next) {
                    continue;
                }

                // A sum of finite weights may overflow to infinity; a node
                // not yet reached must still be relaxed.
                let next_cost = cost + edge.weight;
                if dist.get(next).map_or(true, |&known| next_cost < known) {
                    dist.insert(next, next_cost);
                    prev.insert(next, node_id);
                    seq += 1;
                    heap.push(DijkstraState {
                        cost: next_cost,
                        seq,
                        node_id: next,
                    });
                }
            }
        }

        Ok(Self::no_path(from, to))
    }

    /// Sum of link weights along consecutive nodes, `None` if a link is
    /// missing
    pub fn path_weight(graph: &TopologyGraph, nodes: &[String]) -> Option<f64> {
        nodes.windows(2).try_fold(0.0, |acc, pair| {
            graph
                .find_edge(&pair[0], &pair[1])
                .map(|edge| acc + edge.weight)
        })
    }

    fn ensure_endpoints(graph: &TopologyGraph, from: &str, to: &str) -> Result<()> {
        for id in [from, to] {
            if !graph.contains(id) {
                return Err(RouteSimError::UnknownNode(id.to_string()));
            }
        }
        Ok(())
    }

    /// Walk the predecessor chain back from `to` and reverse it
    fn reconstruct(prev: &HashMap<&str, &str>, from: &str, to: &str) -> Vec<String> {
        let mut nodes = vec![to.to_string()];
        let mut current = to;

        while current != from {
            match prev.get(current) {
                Some(&p) => {
                    nodes.push(p.to_string());
                    current = p;
                }
                None => break,
            }
        }

        nodes.reverse();
        nodes
    }

    fn no_path(from: &str, to: &str) -> RouteOutcome {
        RouteOutcome::NoPath {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_graph() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_node("N1", 0.0, 0.0).unwrap();
        graph.add_node("N2", 10.0, 0.0).unwrap();
        graph.add_node("N3", 20.0, 0.0).unwrap();
        graph.add_node("N4", 10.0, 10.0).unwrap();
        graph.add_edge("N1", "N2", 1.0).unwrap();
        graph.add_edge("N2", "N3", 1.0).unwrap();
        graph.add_edge("N1", "N4", 5.0).unwrap();
        graph.add_edge("N4", "N3", 1.0).unwrap();
        graph
    }

    fn nodes(outcome: &RouteOutcome) -> Vec<&str> {
        outcome
            .path()
            .expect("expected a path")
            .nodes
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_hop_path_has_two_hops() {
        let graph = create_test_graph();
        let outcome = TopologyEngine::find_hop_path(&graph, "N1", "N3").unwrap();

        let path = outcome.path().unwrap();
        assert_eq!(path.hops(), 2);
        assert!(path.nodes == ["N1", "N2", "N3"] || path.nodes == ["N1", "N4", "N3"]);
    }

    #[test]
    fn test_hop_path_follows_insertion_order() {
        let graph = create_test_graph();
        let outcome = TopologyEngine::find_hop_path(&graph, "N1", "N3").unwrap();
        assert_eq!(nodes(&outcome), vec!["N1", "N2", "N3"]);
        assert_eq!(outcome.path().unwrap().total_weight, 2.0);
    }

    #[test]
    fn test_weighted_path_prefers_cheaper_route() {
        let graph = create_test_graph();
        let outcome = TopologyEngine::find_weighted_path(&graph, "N1", "N3").unwrap();

        assert_eq!(nodes(&outcome), vec!["N1", "N2", "N3"]);
        assert_eq!(outcome.path().unwrap().total_weight, 2.0);
    }

    #[test]
    fn test_weighted_path_takes_more_hops_when_cheaper() {
        let mut graph = create_test_graph();
        graph.add_edge("N1", "N3", 10.0).unwrap();

        let hop = TopologyEngine::find_hop_path(&graph, "N1", "N3").unwrap();
        let weighted = TopologyEngine::find_weighted_path(&graph, "N1", "N3").unwrap();

        assert_eq!(nodes(&hop), vec!["N1", "N3"]);
        assert_eq!(nodes(&weighted), vec!["N1", "N2", "N3"]);
    }

    #[test]
    fn test_route_after_removing_middle_node() {
        let mut graph = create_test_graph();
        graph.remove_node("N2").unwrap();

        for mode in [WeightingMode::HopCount, WeightingMode::Weighted] {
            let outcome = TopologyEngine::find_route(&graph, "N1", "N3", mode).unwrap();
            assert_eq!(nodes(&outcome), vec!["N1", "N4", "N3"]);
            assert_eq!(outcome.path().unwrap().total_weight, 6.0);
        }
    }

    #[test]
    fn test_same_source_and_destination() {
        let graph = create_test_graph();
        for mode in [WeightingMode::HopCount, WeightingMode::Weighted] {
            let outcome = TopologyEngine::find_route(&graph, "N2", "N2", mode).unwrap();
            assert_eq!(outcome, RouteOutcome::Found(Path::single("N2")));
        }
    }

    #[test]
    fn test_disconnected_nodes_have_no_path() {
        let mut graph = TopologyGraph::new();
        graph.add_node("A", 0.0, 0.0).unwrap();
        graph.add_node("B", 5.0, 5.0).unwrap();

        for mode in [WeightingMode::HopCount, WeightingMode::Weighted] {
            let outcome = TopologyEngine::find_route(&graph, "A", "B", mode).unwrap();
            assert_eq!(
                outcome,
                RouteOutcome::NoPath {
                    from: "A".to_string(),
                    to: "B".to_string()
                }
            );
        }
    }

    #[test]
    fn test_unknown_endpoint_is_an_error() {
        let graph = create_test_graph();
        for mode in [WeightingMode::HopCount, WeightingMode::Weighted] {
            let err = TopologyEngine::find_route(&graph, "N1", "N9", mode).unwrap_err();
            assert!(matches!(err, RouteSimError::UnknownNode(ref id) if id == "N9"));
        }
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let graph = create_test_graph();
        for mode in [WeightingMode::HopCount, WeightingMode::Weighted] {
            let first = TopologyEngine::find_route(&graph, "N4", "N2", mode).unwrap();
            let second = TopologyEngine::find_route(&graph, "N4", "N2", mode).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_zero_weight_links() {
        let mut graph = TopologyGraph::new();
        for id in ["A", "B", "C"] {
            graph.add_node(id, 0.0, 0.0).unwrap();
        }
        graph.add_edge("A", "B", 0.0).unwrap();
        graph.add_edge("B", "C", 0.0).unwrap();
        graph.add_edge("A", "C", 0.5).unwrap();

        let outcome = TopologyEngine::find_weighted_path(&graph, "A", "C").unwrap();
        assert_eq!(nodes(&outcome), vec!["A", "B", "C"]);
        assert_eq!(outcome.path().unwrap().total_weight, 0.0);
    }

    #[test]
    fn test_weight_overflow_still_finds_route() {
        let mut graph = TopologyGraph::new();
        for id in ["A", "B", "C"] {
            graph.add_node(id, 0.0, 0.0).unwrap();
        }
        graph.add_edge("A", "B", f64::MAX).unwrap();
        graph.add_edge("B", "C", f64::MAX).unwrap();

        let hop = TopologyEngine::find_hop_path(&graph, "A", "C").unwrap();
        let weighted = TopologyEngine::find_weighted_path(&graph, "A", "C").unwrap();

        assert_eq!(nodes(&hop), vec!["A", "B", "C"]);
        assert_eq!(nodes(&weighted), vec!["A", "B", "C"]);
        assert!(weighted.path().unwrap().total_weight.is_infinite());
    }

    #[test]
    fn test_path_weight() {
        let graph = create_test_graph();
        let route = vec!["N1".to_string(), "N4".to_string(), "N3".to_string()];
        assert_eq!(TopologyEngine::path_weight(&graph, &route), Some(6.0));

        let broken = vec!["N1".to_string(), "N3".to_string()];
        assert_eq!(TopologyEngine::path_weight(&graph, &broken), None);
    }

    #[test]
    fn test_path_display() {
        let path = Path {
            nodes: vec!["N1".into(), "N2".into(), "N3".into()],
            total_weight: 2.0,
        };
        assert_eq!(path.to_string(), "N1 → N2 → N3");
        assert_eq!(path.source(), Some("N1"));
        assert_eq!(path.destination(), Some("N3"));
    }

    #[test]
    fn test_weighting_mode_parse() {
        assert_eq!("hop".parse::<WeightingMode>().unwrap(), WeightingMode::HopCount);
        assert_eq!("Weighted".parse::<WeightingMode>().unwrap(), WeightingMode::Weighted);
        assert!("fastest".parse::<WeightingMode>().is_err());
    }
}
