//! Route orchestration - source/destination selection into a single path query

use super::engine::{RouteOutcome, TopologyEngine, WeightingMode};
use super::graph::TopologyGraph;
use crate::{Result, RouteSimError};
use serde::{Deserialize, Serialize};

/// Where the orchestrator is in the selection sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RouteState {
    /// No source chosen
    #[default]
    Idle,
    /// Waiting for a destination
    SourceChosen { source: String },
    /// Holds the most recent route result
    RouteComputed {
        source: String,
        destination: String,
        mode: WeightingMode,
        outcome: RouteOutcome,
    },
}

/// Result of a rerun request
#[derive(Debug, Clone, PartialEq)]
pub enum RerunOutcome {
    Computed(RouteOutcome),
    /// No route was ever requested
    NothingToRerun,
}

/// Sequences a source and destination selection into one pathfinding call
/// and remembers the last pair for reruns.
///
/// Holds no graph data; every call borrows the graph it should work on.
#[derive(Debug, Clone, Default)]
pub struct RouteOrchestrator {
    state: RouteState,
    last_pair: Option<(String, String)>,
}

impl RouteOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RouteState {
        &self.state
    }

    /// The (source, destination) pair a rerun would use
    pub fn last_pair(&self) -> Option<(&str, &str)> {
        self.last_pair
            .as_ref()
            .map(|(s, d)| (s.as_str(), d.as_str()))
    }

    /// The currently displayed route, if any
    pub fn current_route(&self) -> Option<&RouteOutcome> {
        match &self.state {
            RouteState::RouteComputed { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Choose the source node. Starts a new selection from any state.
    pub fn select_source(&mut self, graph: &TopologyGraph, source: &str) -> Result<()> {
        if !graph.contains(source) {
            return Err(RouteSimError::UnknownNode(source.to_string()));
        }
        tracing::debug!(source, "route source selected");
        self.state = RouteState::SourceChosen {
            source: source.to_string(),
        };
        Ok(())
    }

    /// Choose the destination and compute the route with `mode`
    pub fn select_destination(
        &mut self,
        graph: &TopologyGraph,
        destination: &str,
        mode: WeightingMode,
    ) -> Result<RouteOutcome> {
        let source = match &self.state {
            RouteState::SourceChosen { source } => source.clone(),
            _ => return Err(RouteSimError::NoSourceSelected),
        };
        self.compute_route(graph, &source, destination, mode)
    }

    /// One-shot route query. Records the pair and result like a completed
    /// selection. On error the previous state is kept.
    pub fn compute_route(
        &mut self,
        graph: &TopologyGraph,
        source: &str,
        destination: &str,
        mode: WeightingMode,
    ) -> Result<RouteOutcome> {
        let outcome = TopologyEngine::find_route(graph, source, destination, mode)?;

        match &outcome {
            RouteOutcome::Found(path) => tracing::info!(
                %mode,
                hops = path.hops(),
                weight = path.total_weight,
                "route {}",
                path
            ),
            RouteOutcome::NoPath { from, to } => {
                tracing::info!(%mode, "no path from {} to {}", from, to)
            }
        }

        self.last_pair = Some((source.to_string(), destination.to_string()));
        self.state = RouteState::RouteComputed {
            source: source.to_string(),
            destination: destination.to_string(),
            mode,
            outcome: outcome.clone(),
        };
        Ok(outcome)
    }

    /// Drop the current selection or route. The rerun pair is kept.
    pub fn clear_route(&mut self) {
        self.state = RouteState::Idle;
    }

    /// Recompute the last pair with the *current* mode, which may differ
    /// from the one originally used.
    ///
    /// Fails with `UnknownNode` if an endpoint was removed since.
    pub fn rerun(&mut self, graph: &TopologyGraph, mode: WeightingMode) -> Result<RerunOutcome> {
        let Some((source, destination)) = self.last_pair.clone() else {
            tracing::debug!("rerun requested with no previous route");
            return Ok(RerunOutcome::NothingToRerun);
        };
        self.compute_route(graph, &source, &destination, mode)
            .map(RerunOutcome::Computed)
    }

    /// Called after the topology changed. A computed route goes back to
    /// `Idle`; a pending source survives only if it still exists.
    pub fn invalidate(&mut self, graph: &TopologyGraph) {
        match &self.state {
            RouteState::Idle => {}
            RouteState::SourceChosen { source } => {
                if !graph.contains(source) {
                    tracing::debug!(source = %source, "selected source removed");
                    self.state = RouteState::Idle;
                }
            }
            RouteState::RouteComputed { .. } => {
                tracing::debug!("topology changed, dropping computed route");
                self.state = RouteState::Idle;
            }
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

    #[test]
    fn test_select_source_then_destination() {
        let graph = create_test_graph();
        let mut orchestrator = RouteOrchestrator::new();
        assert_eq!(orchestrator.state(), &RouteState::Idle);

        orchestrator.select_source(&graph, "N1").unwrap();
        assert_eq!(
            orchestrator.state(),
            &RouteState::SourceChosen { source: "N1".into() }
        );

        let outcome = orchestrator
            .select_destination(&graph, "N3", WeightingMode::Weighted)
            .unwrap();
        assert_eq!(outcome.path().unwrap().total_weight, 2.0);
        assert_eq!(orchestrator.current_route(), Some(&outcome));
        assert_eq!(orchestrator.last_pair(), Some(("N1", "N3")));
    }

    #[test]
    fn test_destination_without_source_fails() {
        let graph = create_test_graph();
        let mut orchestrator = RouteOrchestrator::new();

        let err = orchestrator
            .select_destination(&graph, "N3", WeightingMode::HopCount)
            .unwrap_err();
        assert!(matches!(err, RouteSimError::NoSourceSelected));
        assert_eq!(orchestrator.state(), &RouteState::Idle);
    }

    #[test]
    fn test_unknown_destination_keeps_source() {
        let graph = create_test_graph();
        let mut orchestrator = RouteOrchestrator::new();
        orchestrator.select_source(&graph, "N1").unwrap();

        assert!(orchestrator
            .select_destination(&graph, "N9", WeightingMode::HopCount)
            .is_err());
        assert_eq!(
            orchestrator.state(),
            &RouteState::SourceChosen { source: "N1".into() }
        );
        assert_eq!(orchestrator.last_pair(), None);
    }

    #[test]
    fn test_clear_route_keeps_rerun_pair() {
        let graph = create_test_graph();
        let mut orchestrator = RouteOrchestrator::new();
        orchestrator
            .compute_route(&graph, "N1", "N3", WeightingMode::HopCount)
            .unwrap();

        orchestrator.clear_route();
        assert_eq!(orchestrator.state(), &RouteState::Idle);
        assert!(orchestrator.current_route().is_none());
        assert_eq!(orchestrator.last_pair(), Some(("N1", "N3")));
    }

    #[test]
    fn test_rerun_uses_current_mode() {
        let mut graph = create_test_graph();
        graph.add_edge("N1", "N3", 10.0).unwrap();
        let mut orchestrator = RouteOrchestrator::new();

        let first = orchestrator
            .compute_route(&graph, "N1", "N3", WeightingMode::HopCount)
            .unwrap();
        assert_eq!(first.path().unwrap().hops(), 1);

        let RerunOutcome::Computed(second) =
            orchestrator.rerun(&graph, WeightingMode::Weighted).unwrap()
        else {
            panic!("expected a computed rerun");
        };
        assert_eq!(second.path().unwrap().nodes, vec!["N1", "N2", "N3"]);
        match orchestrator.state() {
            RouteState::RouteComputed { mode, .. } => assert_eq!(*mode, WeightingMode::Weighted),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_rerun_without_history() {
        let graph = create_test_graph();
        let mut orchestrator = RouteOrchestrator::new();
        assert_eq!(
            orchestrator.rerun(&graph, WeightingMode::HopCount).unwrap(),
            RerunOutcome::NothingToRerun
        );
        assert_eq!(orchestrator.state(), &RouteState::Idle);
    }

    #[test]
    fn test_rerun_after_endpoint_removed() {
        let mut graph = create_test_graph();
        let mut orchestrator = RouteOrchestrator::new();
        orchestrator
            .compute_route(&graph, "N1", "N3", WeightingMode::HopCount)
            .unwrap();

        graph.remove_node("N3").unwrap();
        orchestrator.invalidate(&graph);

        let err = orchestrator
            .rerun(&graph, WeightingMode::HopCount)
            .unwrap_err();
        assert!(matches!(err, RouteSimError::UnknownNode(ref id) if id == "N3"));
    }

    #[test]
    fn test_no_path_is_recorded() {
        let mut graph = create_test_graph();
        graph.add_node("N5", 50.0, 50.0).unwrap();
        let mut orchestrator = RouteOrchestrator::new();

        let outcome = orchestrator
            .compute_route(&graph, "N1", "N5", WeightingMode::Weighted)
            .unwrap();
        assert!(!outcome.is_found());
        assert_eq!(orchestrator.last_pair(), Some(("N1", "N5")));

        // Linking N5 makes the rerun succeed
        graph.add_edge("N3", "N5", 1.0).unwrap();
        let rerun = orchestrator.rerun(&graph, WeightingMode::Weighted).unwrap();
        match rerun {
            RerunOutcome::Computed(RouteOutcome::Found(path)) => {
                assert_eq!(path.nodes, vec!["N1", "N2", "N3", "N5"]);
            }
            other => panic!("unexpected rerun {:?}", other),
        }
    }

    #[test]
    fn test_invalidate() {
        let mut graph = create_test_graph();
        let mut orchestrator = RouteOrchestrator::new();

        orchestrator.select_source(&graph, "N2").unwrap();
        orchestrator.invalidate(&graph);
        assert_eq!(
            orchestrator.state(),
            &RouteState::SourceChosen { source: "N2".into() }
        );

        graph.remove_node("N2").unwrap();
        orchestrator.invalidate(&graph);
        assert_eq!(orchestrator.state(), &RouteState::Idle);

        orchestrator
            .compute_route(&graph, "N1", "N3", WeightingMode::HopCount)
            .unwrap();
        orchestrator.invalidate(&graph);
        assert_eq!(orchestrator.state(), &RouteState::Idle);
        assert_eq!(orchestrator.last_pair(), Some(("N1", "N3")));
    }
}
