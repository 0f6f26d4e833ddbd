//! Non-interactive commands

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use routesim::{RouteOutcome, RouteSimConfig, Simulation, TopologySummary, WeightingMode};
use serde::Serialize;

use crate::{config::Config, output::OutputHandler};

/// Routes computed by the demo for one topology
#[derive(Debug, Serialize)]
pub struct DemoStage {
    pub label: String,
    pub summary: TopologySummary,
    pub routes: Vec<DemoRoute>,
}

#[derive(Debug, Serialize)]
pub struct DemoRoute {
    pub mode: WeightingMode,
    pub outcome: RouteOutcome,
}

/// Four nodes where the fewest hops and the lightest route agree until N2
/// is removed: N1-N2 1, N2-N3 1, N1-N4 5, N4-N3 1
fn demo_simulation(config: RouteSimConfig) -> Result<Simulation> {
    let mut sim = Simulation::new(config)?;
    for (x, y) in [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (10.0, 10.0)] {
        sim.create_node(x, y)?;
    }
    let prefix = sim.config().node_id_prefix.clone();
    let id = |n: usize| format!("{}{}", prefix, n);
    sim.connect(&id(1), &id(2), 1.0)?;
    sim.connect(&id(2), &id(3), 1.0)?;
    sim.connect(&id(1), &id(4), 5.0)?;
    sim.connect(&id(4), &id(3), 1.0)?;
    Ok(sim)
}

fn demo_stage(sim: &mut Simulation, label: &str, from: &str, to: &str) -> Result<DemoStage> {
    let mut routes = Vec::new();
    for mode in [WeightingMode::HopCount, WeightingMode::Weighted] {
        let outcome = sim.compute_route(from, to, mode)?;
        routes.push(DemoRoute { mode, outcome });
    }
    Ok(DemoStage {
        label: label.to_string(),
        summary: sim.summary(),
        routes,
    })
}

/// Run the four-node scenario before and after removing the middle node
pub fn run_demo(config: &Config) -> Result<Vec<DemoStage>> {
    let mut sim = demo_simulation(config.simulation.clone())?;
    let prefix = sim.config().node_id_prefix.clone();
    let (from, middle, to) = (
        format!("{}1", prefix),
        format!("{}2", prefix),
        format!("{}3", prefix),
    );

    let before = demo_stage(&mut sim, "initial topology", &from, &to)?;
    sim.remove_node(&middle)?;
    let after = demo_stage(&mut sim, &format!("after removing {}", middle), &from, &to)?;
    Ok(vec![before, after])
}

pub fn demo(config: &Config, json: bool) -> Result<()> {
    let stages = run_demo(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stages)?);
        return Ok(());
    }

    let output = OutputHandler::new(config.display.show_coordinates);
    for stage in &stages {
        output.print_header(&format!("Demo: {}", stage.label));
        for route in &stage.routes {
            output.print_route(&route.outcome, route.mode);
        }
        println!();
        output.print_summary(&stage.summary, config.simulation.default_mode);
    }
    println!();

    Ok(())
}

pub fn show_config(config: &Config, path: &Path) -> Result<()> {
    let output = OutputHandler::new(false);

    output.print_header("Configuration");
    println!("  {} {}", "file:".dimmed(), path.display());

    let sim = &config.simulation;
    println!();
    println!("  {}", "[simulation]".bright_cyan());
    println!("    {} = \"{}\"", "node_id_prefix".dimmed(), sim.node_id_prefix);
    println!("    {} = \"{}\"", "default_mode".dimmed(), sim.default_mode);
    println!("    {} = {}", "default_edge_weight".dimmed(), sim.default_edge_weight);
    println!(
        "    {} = {}",
        "allow_negative_weights".dimmed(),
        sim.allow_negative_weights
    );
    println!(
        "    {} = {}",
        "invalidate_on_mutation".dimmed(),
        sim.invalidate_on_mutation
    );
    println!("    {} = {}", "event_log_capacity".dimmed(), sim.event_log_capacity);

    println!();
    println!("  {}", "[display]".bright_cyan());
    println!("    {} = {}", "show_banner".dimmed(), config.display.show_banner);
    println!(
        "    {} = {}",
        "show_coordinates".dimmed(),
        config.display.show_coordinates
    );
    println!("    {} = {}", "log_lines".dimmed(), config.display.log_lines);
    println!();

    Ok(())
}

pub fn get_config(config: &Config, key: &str) -> Result<()> {
    match config.get(key) {
        Some(value) => println!("{}", value),
        None => OutputHandler::new(false)
            .print_error(&format!("Unknown configuration key: {}", key)),
    }
    Ok(())
}

pub fn set_config(path: &Path, kv: &str) -> Result<()> {
    let output = OutputHandler::new(false);

    let Some((key, value)) = kv.split_once('=') else {
        output.print_error("Invalid format. Use: key=value");
        return Ok(());
    };
    let key = key.trim();
    let value = value.trim().trim_matches('"');

    let mut config = Config::load_from(path)?;
    match config.set(key, value) {
        Ok(()) => {
            config.save_to(path)?;
            output.print_success(&format!("Set {} = \"{}\"", key, value));
        }
        Err(e) => {
            output.print_error(&format!("Failed to set config: {:#}", e));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_stages() {
        let stages = run_demo(&Config::default()).unwrap();
        assert_eq!(stages.len(), 2);

        let initial: Vec<String> = stages[0]
            .routes
            .iter()
            .map(|r| r.outcome.path().unwrap().to_string())
            .collect();
        assert_eq!(initial, vec!["N1 → N2 → N3", "N1 → N2 → N3"]);

        for route in &stages[1].routes {
            assert_eq!(route.outcome.path().unwrap().to_string(), "N1 → N4 → N3");
        }
        assert_eq!(stages[1].summary.node_count, 3);
        assert_eq!(stages[1].summary.link_count, 2);
    }

    #[test]
    fn test_demo_with_custom_prefix() {
        let mut config = Config::default();
        config.set("simulation.node_id_prefix", "R").unwrap();
        let stages = run_demo(&config).unwrap();
        assert_eq!(stages[1].label, "after removing R2");
    }

    #[test]
    fn test_demo_serializes() {
        let stages = run_demo(&Config::default()).unwrap();
        let json = serde_json::to_value(&stages).unwrap();
        assert_eq!(json[0]["routes"][1]["mode"], "weighted");
        assert_eq!(json[0]["routes"][0]["outcome"]["status"], "found");
    }

    #[test]
    fn test_get_config_accepts_any_key() {
        let config = Config::default();
        assert!(get_config(&config, "display.log_lines").is_ok());
        assert!(get_config(&config, "display.nope").is_ok());
    }

    #[test]
    fn test_set_config_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        set_config(&path, "simulation.default_mode=weighted").unwrap();
        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.simulation.default_mode, WeightingMode::Weighted);
        assert_eq!(saved.get("simulation.default_mode").unwrap(), "weighted");

        // A rejected value leaves the file as it was
        set_config(&path, "simulation.event_log_capacity=0").unwrap();
        assert_eq!(
            Config::load_from(&path).unwrap().simulation.event_log_capacity,
            500
        );
    }
}
