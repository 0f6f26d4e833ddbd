//! Graph model for the network topology

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Result, RouteSimError};

/// A node in the topology graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
}

/// A directed edge record. Every undirected link is stored as two of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, weight: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }
}

/// What `add_edge` did to the graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeChange {
    /// Both directed records were created
    Created,
    /// The link already existed; both records were re-weighted
    Updated { previous: f64 },
}

/// Parse a weight typed by a user ("1.5", " 2 ").
///
/// Only finite numbers are accepted; the sign is checked later by the graph
/// because it depends on the weight policy.
pub fn parse_weight(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(weight) if weight.is_finite() => Ok(weight),
        _ => Err(RouteSimError::InvalidWeight(trimmed.to_string())),
    }
}

/// The topology graph: nodes keyed by id plus an adjacency list of directed
/// edge records.
///
/// Not internally synchronized. Share it across threads behind a single
/// mutex.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TopologyGraph {
    pub(crate) nodes: IndexMap<String, Node>,
    pub(crate) adjacency: IndexMap<String, Vec<Edge>>,
    #[serde(skip)]
    pub(crate) allow_negative_weights: bool,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            adjacency: IndexMap::new(),
            allow_negative_weights: false,
        }
    }

    /// Accept negative weights on new edges. Weighted routes over such a
    /// graph are not guaranteed to be minimal.
    pub fn with_negative_weights(mut self, allow: bool) -> Self {
        self.allow_negative_weights = allow;
        self
    }

    /// Add a node with an empty adjacency entry
    pub fn add_node(&mut self, id: impl Into<String>, x: f64, y: f64) -> Result<&Node> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(RouteSimError::InvalidNode {
                id,
                reason: "node id must not be empty".to_string(),
            });
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(RouteSimError::InvalidNode {
                id,
                reason: format!("coordinates must be finite, got ({}, {})", x, y),
            });
        }
        if self.nodes.contains_key(&id) {
            return Err(RouteSimError::IdConflict(id));
        }

        tracing::debug!(node = %id, x, y, "adding node");
        self.adjacency.insert(id.clone(), Vec::new());
        let node: &Node = self.nodes.entry(id.clone()).or_insert(Node::new(id, x, y));
        Ok(node)
    }

    /// Move a node on the canvas. Routing ignores coordinates.
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(RouteSimError::InvalidNode {
                id: id.to_string(),
                reason: format!("coordinates must be finite, got ({}, {})", x, y),
            });
        }
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| RouteSimError::UnknownNode(id.to_string()))?;
        node.set_position(x, y);
        Ok(())
    }

    /// Add an undirected link, or re-weight it if it already exists
    pub fn add_edge(&mut self, from: &str, to: &str, weight: f64) -> Result<EdgeChange> {
        for id in [from, to] {
            if !self.nodes.contains_key(id) {
                return Err(RouteSimError::UnknownNode(id.to_string()));
            }
        }
        if from == to {
            return Err(RouteSimError::InvalidEdge {
                from: from.to_string(),
                to: to.to_string(),
                reason: "self-loops are not allowed".to_string(),
            });
        }
        if !weight.is_finite() {
            return Err(RouteSimError::InvalidEdge {
                from: from.to_string(),
                to: to.to_string(),
                reason: format!("weight must be finite, got {}", weight),
            });
        }
        if weight < 0.0 && !self.allow_negative_weights {
            return Err(RouteSimError::InvalidEdge {
                from: from.to_string(),
                to: to.to_string(),
                reason: format!("weight must be non-negative, got {}", weight),
            });
        }

        if self.has_edge(from, to) && self.has_edge(to, from) {
            let mut previous = weight;
            for (a, b) in [(from, to), (to, from)] {
                if let Some(edge) = self.edge_mut(a, b) {
                    previous = edge.weight;
                    edge.weight = weight;
                }
            }
            tracing::debug!(from, to, weight, previous, "re-weighted link");
            return Ok(EdgeChange::Updated { previous });
        }

        // A half-present link can only come from hand-built state; drop the
        // stray record so both directions are recreated together.
        self.remove_edge(from, to);

        for (a, b) in [(from, to), (to, from)] {
            if let Some(edges) = self.adjacency.get_mut(a) {
                edges.push(Edge::new(a, b, weight));
            }
        }
        tracing::debug!(from, to, weight, "added link");
        Ok(EdgeChange::Created)
    }

    /// Remove the link between `a` and `b` in both directions.
    ///
    /// Returns whether anything was removed; a missing link is not an error.
    pub fn remove_edge(&mut self, a: &str, b: &str) -> bool {
        let mut removed = false;
        for (x, y) in [(a, b), (b, a)] {
            if let Some(edges) = self.adjacency.get_mut(x) {
                let before = edges.len();
                edges.retain(|e| e.to != y);
                removed |= edges.len() != before;
            }
        }
        if removed {
            tracing::debug!(a, b, "removed link");
        }
        removed
    }

    /// Remove a node together with every edge that references it
    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        if !self.nodes.contains_key(id) {
            return Err(RouteSimError::UnknownNode(id.to_string()));
        }

        for edges in self.adjacency.values_mut() {
            edges.retain(|e| e.to != id);
        }
        self.adjacency.shift_remove(id);
        let node = self
            .nodes
            .shift_remove(id)
            .ok_or_else(|| RouteSimError::UnknownNode(id.to_string()))?;

        tracing::debug!(node = %id, "removed node and its links");
        Ok(node)
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Outgoing edge records of a node, in insertion order
    pub fn edges(&self, id: &str) -> Result<&[Edge]> {
        self.adjacency
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| RouteSimError::UnknownNode(id.to_string()))
    }

    /// Outgoing edges of a node, empty for unknown ids
    pub(crate) fn edges_from(&self, id: &str) -> &[Edge] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Each undirected link once, as the record stored on the endpoint
    /// inserted first
    pub fn links(&self) -> Vec<&Edge> {
        self.adjacency
            .values()
            .flatten()
            .filter(|e| {
                let from = self.nodes.get_index_of(&e.from);
                let to = self.nodes.get_index_of(&e.to);
                from < to
            })
            .collect()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Neighbor ids of a node (targets of its outgoing records)
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.edges_from(id).iter().map(|e| e.to.as_str()).collect()
    }

    /// Find the directed record `from -> to`
    pub fn find_edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges_from(from).iter().find(|e| e.to == to)
    }

    fn edge_mut(&mut self, from: &str, to: &str) -> Option<&mut Edge> {
        self.adjacency
            .get_mut(from)
            .and_then(|edges| edges.iter_mut().find(|e| e.to == to))
    }

    /// Check if the directed record `from -> to` exists
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.find_edge(from, to).is_some()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.edges_from(id).len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected links
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Nodes without any link
    pub fn isolated_nodes(&self) -> Vec<&str> {
        self.nodes
            .keys()
            .filter(|id| self.degree(id) == 0)
            .map(String::as_str)
            .collect()
    }
}
