//! # routesim - interactive network routing simulator core
//!
//! Models a network topology of nodes placed on a canvas and weighted,
//! undirected links between them, and computes routes between two nodes.
//!
//! ## Core Capabilities
//!
//! - **Topology**: add, move and remove nodes; create, re-weight and remove links
//! - **Hop-count routing**: breadth-first search for the fewest links
//! - **Weighted routing**: Dijkstra's algorithm for the smallest total weight
//! - **Route orchestration**: source/destination selection, clear and rerun
//! - **Event log**: timestamped record of every command and result
//!
//! Everything is synchronous and single-threaded. A [`Simulation`] is not
//! internally synchronized; guard it with one mutex if several threads
//! need it.

pub mod config;
pub mod events;
pub mod session;
pub mod topology;

pub use config::RouteSimConfig;
pub use events::{EventLog, LogEntry};
pub use session::Simulation;
pub use topology::{
    engine::{Path, RouteOutcome, TopologyEngine, WeightingMode},
    graph::{parse_weight, Edge, EdgeChange, Node, TopologyGraph},
    invariants::{InvariantChecker, InvariantViolation, ViolationSeverity},
    routing::{RerunOutcome, RouteOrchestrator, RouteState},
};

use serde::{Deserialize, Serialize};

/// Main error types for routesim operations.
///
/// A query that finds no route is not an error; see [`RouteOutcome::NoPath`].
#[derive(Debug, thiserror::Error)]
pub enum RouteSimError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Node id already in use: {0}")]
    IdConflict(String),

    #[error("Invalid node {id}: {reason}")]
    InvalidNode { id: String, reason: String },

    #[error("Invalid edge {from} ↔ {to}: {reason}")]
    InvalidEdge {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Invalid weight: '{0}' is not a finite number")]
    InvalidWeight(String),

    #[error("No source selected; choose a source before a destination")]
    NoSourceSelected,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, RouteSimError>;

/// Summary of the current simulation state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySummary {
    pub node_count: usize,
    pub link_count: usize,
    pub isolated_nodes: usize,
    pub has_route: bool,
    pub event_count: usize,
}
