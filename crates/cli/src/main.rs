//! routesim - interactive network routing simulator
//!
//! Build a topology of nodes and weighted links from the terminal and
//! compute hop-count or weighted routes between them.

mod commands;
mod config;
mod output;
mod repl;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use routesim::WeightingMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// routesim - network routing simulator
#[derive(Parser)]
#[command(name = "routesim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build network topologies and compute routes between nodes")]
#[command(long_about = r#"
routesim lets you place nodes, link them with weighted undirected edges and
compute routes by fewest hops (breadth-first search) or smallest total
weight (Dijkstra).

Examples:
  routesim                     # Start the interactive shell
  routesim --mode weighted     # Start with weighted routing
  routesim demo --json         # Run the four-node scenario as JSON
  routesim config --get simulation.default_mode
  routesim config --set simulation.default_mode=weighted
"#)]
struct Cli {
    /// Weighting mode for the shell (hop or weighted)
    #[arg(short, long, env = "ROUTESIM_MODE")]
    mode: Option<WeightingMode>,

    /// Configuration file (defaults to ~/.routesim/config.toml)
    #[arg(short, long, env = "ROUTESIM_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Run the built-in four-node scenario
    Demo {
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Print one configuration value (e.g. simulation.default_mode)
        #[arg(long, conflicts_with = "set")]
        get: Option<String>,

        /// Set a configuration value (key=value)
        #[arg(long)]
        set: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("routesim={},warn", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::Config::config_path);
    let config = config::Config::load_from(&config_path)?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    match cli.command {
        Some(Commands::Demo { json }) => {
            commands::demo(&config, json)?;
        }
        Some(Commands::Config { show, get, set }) => match (get, set) {
            (Some(key), _) if !show => commands::get_config(&config, &key)?,
            (_, Some(kv)) if !show => commands::set_config(&config_path, &kv)?,
            _ => commands::show_config(&config, &config_path)?,
        },
        Some(Commands::Shell) | None => {
            let mut shell = repl::Shell::new(config, cli.mode)?;
            shell.run()?;
        }
    }

    Ok(())
}
