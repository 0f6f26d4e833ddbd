//! Topology module - Graph model, pathfinding and route orchestration

pub mod engine;
pub mod graph;
pub mod invariants;
pub mod routing;

pub use engine::{Path, RouteOutcome, TopologyEngine, WeightingMode};
pub use graph::{parse_weight, Edge, EdgeChange, Node, TopologyGraph};
pub use invariants::{InvariantChecker, InvariantViolation, ViolationSeverity};
pub use routing::{RerunOutcome, RouteOrchestrator, RouteState};
