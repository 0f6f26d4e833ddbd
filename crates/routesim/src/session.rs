//! Simulation session - the command surface used by front ends
//!
//! Owns the topology, the route orchestrator and the event log, and keeps
//! them consistent: every mutation is logged and, when configured, drops a
//! route that was computed against the old topology.

use crate::config::RouteSimConfig;
use crate::events::EventLog;
use crate::topology::engine::{RouteOutcome, WeightingMode};
use crate::topology::graph::{parse_weight, Edge, EdgeChange, Node, TopologyGraph};
use crate::topology::invariants::{InvariantChecker, InvariantViolation};
use crate::topology::routing::{RerunOutcome, RouteOrchestrator, RouteState};
use crate::{Result, RouteSimError, TopologySummary};

/// An interactive routing simulation
#[derive(Debug, Clone)]
pub struct Simulation {
    config: RouteSimConfig,
    graph: TopologyGraph,
    orchestrator: RouteOrchestrator,
    events: EventLog,
    node_counter: usize,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::build(RouteSimConfig::default())
    }
}

impl Simulation {
    /// Create a simulation after validating `config`
    pub fn new(config: RouteSimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RouteSimConfig) -> Self {
        tracing::debug!(?config, "creating simulation");
        Self {
            graph: TopologyGraph::new().with_negative_weights(config.allow_negative_weights),
            orchestrator: RouteOrchestrator::new(),
            events: EventLog::with_capacity(config.event_log_capacity),
            node_counter: 0,
            config,
        }
    }

    pub fn config(&self) -> &RouteSimConfig {
        &self.config
    }

    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn route_state(&self) -> &RouteState {
        self.orchestrator.state()
    }

    pub fn last_pair(&self) -> Option<(&str, &str)> {
        self.orchestrator.last_pair()
    }

    pub fn current_route(&self) -> Option<&RouteOutcome> {
        self.orchestrator.current_route()
    }

    // --- topology commands ---

    /// Place a node with the next free auto-numbered id (N1, N2, ...)
    pub fn create_node(&mut self, x: f64, y: f64) -> Result<String> {
        let id = loop {
            self.node_counter += 1;
            let candidate = format!("{}{}", self.config.node_id_prefix, self.node_counter);
            if !self.graph.contains(&candidate) {
                break candidate;
            }
        };
        self.add_node(id.clone(), x, y)?;
        Ok(id)
    }

    /// Place a node with a caller-chosen id
    pub fn add_node(&mut self, id: impl Into<String>, x: f64, y: f64) -> Result<&Node> {
        let id = id.into();
        if let Err(err) = self.graph.add_node(id.clone(), x, y).map(|_| ()) {
            return Err(self.rejected("Node", err));
        }
        self.events.record("Graph", "Add", format!("Node {}", id));
        self.after_mutation();
        self.graph
            .get_node(&id)
            .ok_or(RouteSimError::UnknownNode(id))
    }

    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        if let Err(err) = self.graph.move_node(id, x, y) {
            return Err(self.rejected("Node", err));
        }
        self.events
            .record("Graph", "Move", format!("Node {} to ({}, {})", id, x, y));
        Ok(())
    }

    /// Create or re-weight the link between `a` and `b`
    pub fn connect(&mut self, a: &str, b: &str, weight: f64) -> Result<EdgeChange> {
        let change = match self.graph.add_edge(a, b, weight) {
            Ok(change) => change,
            Err(err) => return Err(self.rejected("Edge", err)),
        };
        self.events
            .record("Graph", "Add/Upd", format!("Edge {}↔{} w={}", a, b, weight));
        self.after_mutation();
        Ok(change)
    }

    /// Like [`connect`](Self::connect) with a weight typed by the user
    pub fn connect_str(&mut self, a: &str, b: &str, weight: &str) -> Result<EdgeChange> {
        let weight = match parse_weight(weight) {
            Ok(weight) => weight,
            Err(err) => return Err(self.rejected("Edge", err)),
        };
        self.connect(a, b, weight)
    }

    /// Link `a` and `b` with the configured default weight
    pub fn connect_default(&mut self, a: &str, b: &str) -> Result<EdgeChange> {
        self.connect(a, b, self.config.default_edge_weight)
    }

    /// Remove the link between `a` and `b`; returns whether one existed
    pub fn disconnect(&mut self, a: &str, b: &str) -> bool {
        let removed = self.graph.remove_edge(a, b);
        if removed {
            self.events
                .record("Graph", "Del", format!("Edge {}↔{}", a, b));
            self.after_mutation();
        }
        removed
    }

    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        let node = match self.graph.remove_node(id) {
            Ok(node) => node,
            Err(err) => return Err(self.rejected("Node", err)),
        };
        self.events
            .record("Graph", "Del", format!("Node {} and its edges removed", id));
        self.after_mutation();
        Ok(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.nodes()
    }

    pub fn edges(&self, id: &str) -> Result<&[Edge]> {
        self.graph.edges(id)
    }

    // --- route commands ---

    /// Compute a route directly between two nodes
    pub fn compute_route(
        &mut self,
        source: &str,
        destination: &str,
        mode: WeightingMode,
    ) -> Result<RouteOutcome> {
        self.events.record(
            "Sim",
            "Start",
            format!("{} {}→{}", mode, source, destination),
        );
        let result = self
            .orchestrator
            .compute_route(&self.graph, source, destination, mode);
        self.record_outcome(result)
    }

    pub fn select_source(&mut self, id: &str) -> Result<()> {
        if let Err(err) = self.orchestrator.select_source(&self.graph, id) {
            return Err(self.rejected("Route", err));
        }
        self.events.record("UI", "Route", format!("Source = {}", id));
        Ok(())
    }

    pub fn select_destination(&mut self, id: &str, mode: WeightingMode) -> Result<RouteOutcome> {
        let source = match self.orchestrator.state() {
            RouteState::SourceChosen { source } => Some(source.clone()),
            _ => None,
        };
        let Some(source) = source else {
            return Err(self.rejected("Route", RouteSimError::NoSourceSelected));
        };
        self.events.record("UI", "Route", format!("Dest   = {}", id));
        self.events
            .record("Sim", "Start", format!("{} {}→{}", mode, source, id));
        let result = self.orchestrator.select_destination(&self.graph, id, mode);
        self.record_outcome(result)
    }

    pub fn clear_route(&mut self) {
        self.orchestrator.clear_route();
        self.events.record("UI", "Clear", "Route cleared");
    }

    /// Recompute the last requested route with `mode`
    pub fn rerun(&mut self, mode: WeightingMode) -> Result<RerunOutcome> {
        let Some((source, destination)) = self
            .orchestrator
            .last_pair()
            .map(|(s, d)| (s.to_string(), d.to_string()))
        else {
            self.events.record(
                "UI",
                "Info",
                "No previous src/dst. Select a route first.",
            );
            return Ok(RerunOutcome::NothingToRerun);
        };

        self.events.record(
            "Sim",
            "Rerun",
            format!("{} {}→{}", mode, source, destination),
        );
        let result = self.orchestrator.rerun(&self.graph, mode);
        match result {
            Ok(RerunOutcome::Computed(outcome)) => {
                self.record_outcome(Ok(outcome)).map(RerunOutcome::Computed)
            }
            Ok(RerunOutcome::NothingToRerun) => Ok(RerunOutcome::NothingToRerun),
            Err(err) => Err(self.rejected("Sim", err)),
        }
    }

    // --- inspection ---

    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        InvariantChecker::new().check_all(&self.graph)
    }

    pub fn summary(&self) -> TopologySummary {
        TopologySummary {
            node_count: self.graph.node_count(),
            link_count: self.graph.edge_count(),
            isolated_nodes: self.graph.isolated_nodes().len(),
            has_route: self.orchestrator.current_route().is_some(),
            event_count: self.events.len(),
        }
    }

    fn record_outcome(&mut self, result: Result<RouteOutcome>) -> Result<RouteOutcome> {
        match result {
            Ok(outcome) => {
                match &outcome {
                    RouteOutcome::Found(path) => {
                        self.events.record("Sim", "Path", path.to_string());
                    }
                    RouteOutcome::NoPath { .. } => {
                        self.events.record("Sim", "Fail", "No path");
                    }
                }
                Ok(outcome)
            }
            Err(err) => Err(self.rejected("Sim", err)),
        }
    }

    /// Log a rejected command and hand the error back to the caller
    fn rejected(&mut self, what: &str, err: RouteSimError) -> RouteSimError {
        tracing::warn!("{} command rejected: {}", what, err);
        self.events.record("Error", what, err.to_string());
        err
    }

    fn after_mutation(&mut self) {
        if self.config.invalidate_on_mutation {
            self.orchestrator.invalidate(&self.graph);
        }
    }
}
