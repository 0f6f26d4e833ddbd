//! Configuration for a routing simulation

use serde::{Deserialize, Serialize};

use crate::topology::engine::WeightingMode;
use crate::{Result, RouteSimError};

/// Core configuration for a [`Simulation`](crate::Simulation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RouteSimConfig {
    /// Prefix for auto-numbered node ids ("N" gives N1, N2, ...)
    #[serde(default = "default_node_id_prefix")]
    pub node_id_prefix: String,
    /// Weighting mode used when a caller does not pass one
    #[serde(default)]
    pub default_mode: WeightingMode,
    /// Weight used for links created without an explicit weight
    #[serde(default = "default_edge_weight")]
    pub default_edge_weight: f64,
    /// Accept negative link weights. Weighted routes are then not
    /// guaranteed to be minimal.
    #[serde(default)]
    pub allow_negative_weights: bool,
    /// Drop the displayed route whenever the topology changes
    #[serde(default = "default_true")]
    pub invalidate_on_mutation: bool,
    /// Maximum number of entries kept in the event log
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_node_id_prefix() -> String {
    "N".to_string()
}

fn default_edge_weight() -> f64 {
    1.0
}

fn default_event_log_capacity() -> usize {
    500
}

impl Default for RouteSimConfig {
    fn default() -> Self {
        Self {
            node_id_prefix: default_node_id_prefix(),
            default_mode: WeightingMode::default(),
            default_edge_weight: default_edge_weight(),
            allow_negative_weights: false,
            invalidate_on_mutation: true,
            event_log_capacity: default_event_log_capacity(),
        }
    }
}

impl RouteSimConfig {
    /// Default configuration that routes by link weight
    pub fn weighted() -> Self {
        Self {
            default_mode: WeightingMode::Weighted,
            ..Default::default()
        }
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.node_id_prefix.trim().is_empty() {
            return Err(RouteSimError::ConfigError(
                "node_id_prefix must not be empty".to_string(),
            ));
        }
        if !self.default_edge_weight.is_finite()
            || (self.default_edge_weight < 0.0 && !self.allow_negative_weights)
        {
            return Err(RouteSimError::ConfigError(format!(
                "default_edge_weight {} is not a usable link weight",
                self.default_edge_weight
            )));
        }
        if self.event_log_capacity == 0 {
            return Err(RouteSimError::ConfigError(
                "event_log_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
