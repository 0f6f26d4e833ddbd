//! Configuration management for the routesim CLI
//!
//! Handles loading and saving configuration from ~/.routesim/config.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use routesim::RouteSimConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the routesim CLI
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub simulation: RouteSimConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_banner: bool,

    #[serde(default = "default_true")]
    pub show_coordinates: bool,

    /// Entries printed by `/log` without an argument
    #[serde(default = "default_log_lines")]
    pub log_lines: usize,
}

fn default_true() -> bool {
    true
}

fn default_log_lines() -> usize {
    15
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_banner: true,
            show_coordinates: true,
            log_lines: default_log_lines(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .with_context(|| format!("{} expects true or false, got '{}'", key, value))
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".routesim")
            .join("config.toml")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.simulation.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get a configuration value by key path (e.g., "simulation.default_mode")
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        let sim = &self.simulation;

        match parts.as_slice() {
            ["simulation", "node_id_prefix"] => Some(sim.node_id_prefix.clone()),
            ["simulation", "default_mode"] => Some(sim.default_mode.to_string()),
            ["simulation", "default_edge_weight"] => Some(sim.default_edge_weight.to_string()),
            ["simulation", "allow_negative_weights"] => {
                Some(sim.allow_negative_weights.to_string())
            }
            ["simulation", "invalidate_on_mutation"] => {
                Some(sim.invalidate_on_mutation.to_string())
            }
            ["simulation", "event_log_capacity"] => Some(sim.event_log_capacity.to_string()),
            ["display", "show_banner"] => Some(self.display.show_banner.to_string()),
            ["display", "show_coordinates"] => Some(self.display.show_coordinates.to_string()),
            ["display", "log_lines"] => Some(self.display.log_lines.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key path. The result is validated but
    /// not saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        let mut updated = self.clone();
        let sim = &mut updated.simulation;

        match parts.as_slice() {
            ["simulation", "node_id_prefix"] => sim.node_id_prefix = value.to_string(),
            ["simulation", "default_mode"] => sim.default_mode = value.parse()?,
            ["simulation", "default_edge_weight"] => {
                sim.default_edge_weight = routesim::parse_weight(value)?
            }
            ["simulation", "allow_negative_weights"] => {
                sim.allow_negative_weights = parse_bool(key, value)?
            }
            ["simulation", "invalidate_on_mutation"] => {
                sim.invalidate_on_mutation = parse_bool(key, value)?
            }
            ["simulation", "event_log_capacity"] => {
                sim.event_log_capacity = value
                    .parse()
                    .with_context(|| format!("{} expects a number", key))?
            }
            ["display", "show_banner"] => updated.display.show_banner = parse_bool(key, value)?,
            ["display", "show_coordinates"] => {
                updated.display.show_coordinates = parse_bool(key, value)?
            }
            ["display", "log_lines"] => {
                updated.display.log_lines = value
                    .parse()
                    .with_context(|| format!("{} expects a number", key))?
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }

        updated.simulation.validate()?;
        *self = updated;
        Ok(())
    }
}
