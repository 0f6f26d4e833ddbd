//! Interactive shell for building topologies and computing routes
//!
//! Every input line is a slash command. Parsing is kept separate from
//! execution so both can be exercised without a terminal.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use routesim::{EdgeChange, RerunOutcome, RouteState, Simulation, WeightingMode};
use rustyline::{error::ReadlineError, history::DefaultHistory, Editor};

use crate::{
    config::{Config, DisplayConfig},
    output::{format_weight, OutputHandler},
};

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    AddNode { x: f64, y: f64, id: Option<String> },
    RemoveNode(String),
    MoveNode { id: String, x: f64, y: f64 },
    Link { a: String, b: String, weight: Option<String> },
    Unlink { a: String, b: String },
    Nodes,
    Edges(String),
    Route { source: String, destination: String },
    Source(String),
    Dest(String),
    Mode(WeightingMode),
    Rerun,
    Clear,
    Log(Option<usize>),
    Check,
    Help,
    Exit,
}

fn coordinate(name: &str, text: &str) -> Result<f64> {
    text.parse()
        .with_context(|| format!("{} must be a number, got '{}'", name, text))
}

fn usage(text: &str) -> anyhow::Error {
    anyhow::anyhow!("Usage: {}", text)
}

/// Parse one line of shell input
pub fn parse(input: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some((command, args)) = parts.split_first() else {
        bail!("Empty command");
    };

    let parsed = match (*command, args) {
        ("/exit" | "/quit" | "/q", []) => ReplCommand::Exit,
        ("/help" | "/h" | "/?", []) => ReplCommand::Help,

        ("/node", ["add", x, y]) => ReplCommand::AddNode {
            x: coordinate("x", x)?,
            y: coordinate("y", y)?,
            id: None,
        },
        ("/node", ["add", x, y, id]) => ReplCommand::AddNode {
            x: coordinate("x", x)?,
            y: coordinate("y", y)?,
            id: Some(id.to_string()),
        },
        ("/node", ["add", ..]) => return Err(usage("/node add <x> <y> [id]")),
        ("/node", ["rm" | "remove", id]) => ReplCommand::RemoveNode(id.to_string()),
        ("/node", ["rm" | "remove", ..]) => return Err(usage("/node rm <id>")),
        ("/node", ["mv" | "move", id, x, y]) => ReplCommand::MoveNode {
            id: id.to_string(),
            x: coordinate("x", x)?,
            y: coordinate("y", y)?,
        },
        ("/node", ["mv" | "move", ..]) => return Err(usage("/node mv <id> <x> <y>")),
        ("/node", _) => return Err(usage("/node add|rm|mv ...")),

        ("/edge" | "/link", [a, b]) => ReplCommand::Link {
            a: a.to_string(),
            b: b.to_string(),
            weight: None,
        },
        ("/edge" | "/link", [a, b, weight]) => ReplCommand::Link {
            a: a.to_string(),
            b: b.to_string(),
            weight: Some(weight.to_string()),
        },
        ("/edge" | "/link", _) => return Err(usage("/edge <a> <b> [weight]")),
        ("/unlink", [a, b]) => ReplCommand::Unlink {
            a: a.to_string(),
            b: b.to_string(),
        },
        ("/unlink", _) => return Err(usage("/unlink <a> <b>")),

        ("/nodes", []) => ReplCommand::Nodes,
        ("/edges", [id]) => ReplCommand::Edges(id.to_string()),
        ("/edges", _) => return Err(usage("/edges <id>")),

        ("/route", [source, destination]) => ReplCommand::Route {
            source: source.to_string(),
            destination: destination.to_string(),
        },
        ("/route", _) => return Err(usage("/route <src> <dst>")),
        ("/source" | "/src", [id]) => ReplCommand::Source(id.to_string()),
        ("/source" | "/src", _) => return Err(usage("/source <id>")),
        ("/dest" | "/dst", [id]) => ReplCommand::Dest(id.to_string()),
        ("/dest" | "/dst", _) => return Err(usage("/dest <id>")),
        ("/mode", [mode]) => ReplCommand::Mode(mode.parse()?),
        ("/mode", _) => return Err(usage("/mode hop|weighted")),
        ("/rerun", []) => ReplCommand::Rerun,
        ("/clear", []) => ReplCommand::Clear,

        ("/log", []) => ReplCommand::Log(None),
        ("/log", [n]) => ReplCommand::Log(Some(
            n.parse()
                .with_context(|| format!("/log expects a count, got '{}'", n))?,
        )),
        ("/check", []) => ReplCommand::Check,

        (other, _) if other.starts_with('/') => {
            bail!("Unknown command: {}. Type /help for available commands.", other)
        }
        _ => bail!("Commands start with '/'. Type /help for available commands."),
    };

    Ok(parsed)
}

/// Whether the shell keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Shell state: the simulation plus the active weighting mode
pub struct Shell {
    sim: Simulation,
    mode: WeightingMode,
    display: DisplayConfig,
    output: OutputHandler,
}

impl Shell {
    pub fn new(config: Config, mode: Option<WeightingMode>) -> Result<Self> {
        let mode = mode.unwrap_or(config.simulation.default_mode);
        let sim = Simulation::new(config.simulation)?;
        Ok(Self {
            sim,
            mode,
            output: OutputHandler::new(config.display.show_coordinates),
            display: config.display,
        })
    }

    #[cfg(test)]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    #[cfg(test)]
    pub fn mode(&self) -> WeightingMode {
        self.mode
    }

    /// Run the interactive loop until /exit or end of input
    pub fn run(&mut self) -> Result<()> {
        let mut editor: Editor<(), DefaultHistory> = Editor::new()?;

        if self.display.show_banner {
            self.output.print_banner(self.mode);
        }

        loop {
            match editor.readline(&self.build_prompt()) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(input);

                    match self.handle_line(input) {
                        Ok(Flow::Exit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => self.output.print_error(&e.to_string()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!();
                    self.output.print_info("Use /exit to quit.");
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(e) => {
                    self.output.print_error(&format!("Input error: {}", e));
                    break;
                }
            }
        }

        Ok(())
    }

    fn build_prompt(&self) -> String {
        let route_part = match self.sim.route_state() {
            RouteState::Idle => String::new(),
            RouteState::SourceChosen { source } => {
                format!(" {}", format!("{}→?", source).bright_yellow())
            }
            RouteState::RouteComputed { source, destination, .. } => {
                format!(" {}", format!("{}→{}", source, destination).bright_green())
            }
        };

        format!(
            "\n{} [{}{}] {} ",
            "routesim".bright_green().bold(),
            self.mode.to_string().bright_cyan(),
            route_part,
            ">".bright_green()
        )
    }

    /// Parse and execute one input line
    pub fn handle_line(&mut self, input: &str) -> Result<Flow> {
        let command = parse(input)?;
        self.execute(command)
    }

    pub fn execute(&mut self, command: ReplCommand) -> Result<Flow> {
        match command {
            ReplCommand::Exit => return Ok(Flow::Exit),
            ReplCommand::Help => self.print_help(),

            ReplCommand::AddNode { x, y, id } => {
                let id = match id {
                    Some(id) => self.sim.add_node(id, x, y)?.id.clone(),
                    None => self.sim.create_node(x, y)?,
                };
                self.output
                    .print_success(&format!("Added node {} at ({}, {})", id, x, y));
            }
            ReplCommand::RemoveNode(id) => {
                self.sim.remove_node(&id)?;
                self.output
                    .print_success(&format!("Removed node {} and its links", id));
            }
            ReplCommand::MoveNode { id, x, y } => {
                self.sim.move_node(&id, x, y)?;
                self.output
                    .print_success(&format!("Moved {} to ({}, {})", id, x, y));
            }
            ReplCommand::Link { a, b, weight } => {
                let change = match weight {
                    Some(weight) => self.sim.connect_str(&a, &b, &weight)?,
                    None => self.sim.connect_default(&a, &b)?,
                };
                let weight = self
                    .sim
                    .graph()
                    .find_edge(&a, &b)
                    .map(|e| format_weight(e.weight))
                    .unwrap_or_default();
                match change {
                    EdgeChange::Created => self
                        .output
                        .print_success(&format!("Linked {} ↔ {} (w={})", a, b, weight)),
                    EdgeChange::Updated { previous } => self.output.print_success(&format!(
                        "Re-weighted {} ↔ {}: {} → {}",
                        a,
                        b,
                        format_weight(previous),
                        weight
                    )),
                }
            }
            ReplCommand::Unlink { a, b } => {
                if self.sim.disconnect(&a, &b) {
                    self.output.print_success(&format!("Unlinked {} ↔ {}", a, b));
                } else {
                    self.output
                        .print_warning(&format!("No link between {} and {}", a, b));
                }
            }

            ReplCommand::Nodes => {
                let graph = self.sim.graph();
                if graph.is_empty() {
                    self.output
                        .print_info("No nodes yet. Add one with /node add <x> <y>.");
                } else {
                    self.output
                        .print_nodes_table(graph.nodes().map(|n| (n, graph.degree(&n.id))));
                }
                self.output.print_summary(&self.sim.summary(), self.mode);
            }
            ReplCommand::Edges(id) => {
                let edges = self.sim.edges(&id)?;
                self.output.print_edges(&id, edges);
            }

            ReplCommand::Route { source, destination } => {
                let outcome = self.sim.compute_route(&source, &destination, self.mode)?;
                self.output.print_route(&outcome, self.mode);
            }
            ReplCommand::Source(id) => {
                self.sim.select_source(&id)?;
                self.output.print_info(&format!(
                    "Source = {}. Pick a destination with /dest <id>.",
                    id
                ));
            }
            ReplCommand::Dest(id) => {
                let outcome = self.sim.select_destination(&id, self.mode)?;
                self.output.print_route(&outcome, self.mode);
            }
            ReplCommand::Mode(mode) => {
                self.mode = mode;
                self.output
                    .print_success(&format!("Weighting mode set to {}", mode));
            }
            ReplCommand::Rerun => match self.sim.rerun(self.mode)? {
                RerunOutcome::Computed(outcome) => self.output.print_route(&outcome, self.mode),
                RerunOutcome::NothingToRerun => self
                    .output
                    .print_info("No previous src/dst. Select a route first."),
            },
            ReplCommand::Clear => {
                self.sim.clear_route();
                self.output.print_info("Route cleared.");
            }

            ReplCommand::Log(count) => {
                let count = count.unwrap_or(self.display.log_lines);
                self.output.print_log(self.sim.events().recent(count));
            }
            ReplCommand::Check => {
                self.output.print_violations(&self.sim.check_invariants());
            }
        }

        Ok(Flow::Continue)
    }

    fn print_help(&self) {
        println!();
        println!("{}", "routesim Commands".bright_white().bold());
        println!("{}", "─".repeat(50).dimmed());
        println!();

        println!("{}", "Topology:".bright_cyan());
        println!("  {}  Place a node", "/node add <x> <y> [id]".bright_yellow());
        println!("  {}          Remove a node and its links", "/node rm <id>".bright_yellow());
        println!("  {}  Move a node", "/node mv <id> <x> <y>".bright_yellow());
        println!("  {}  Create or re-weight a link", "/edge <a> <b> [weight]".bright_yellow());
        println!("  {}         Remove a link", "/unlink <a> <b>".bright_yellow());
        println!("  {}                 List nodes", "/nodes".bright_yellow());
        println!("  {}            List links of a node", "/edges <id>".bright_yellow());
        println!();

        println!("{}", "Routing:".bright_cyan());
        println!("  {}     Compute a route", "/route <src> <dst>".bright_yellow());
        println!("  {}           Choose a source", "/source <id>".bright_yellow());
        println!("  {}             Choose a destination and route", "/dest <id>".bright_yellow());
        println!("  {}   Switch weighting mode", "/mode hop|weighted".bright_yellow());
        println!("  {}                 Recompute the last route", "/rerun".bright_yellow());
        println!("  {}                 Clear the displayed route", "/clear".bright_yellow());
        println!();

        println!("{}", "Other:".bright_cyan());
        println!("  {}               Show recent events", "/log [n]".bright_yellow());
        println!("  {}                 Check topology invariants", "/check".bright_yellow());
        println!("  {}                  Show this help", "/help".bright_yellow());
        println!("  {}                  Exit", "/exit".bright_yellow());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        let mut config = Config::default();
        config.display.show_banner = false;
        Shell::new(config, None).unwrap()
    }

    fn run(shell: &mut Shell, lines: &[&str]) {
        for line in lines {
            shell.handle_line(line).unwrap();
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse("/node add 10 20").unwrap(),
            ReplCommand::AddNode { x: 10.0, y: 20.0, id: None }
        );
        assert_eq!(
            parse("/node add 1.5 -2 R7").unwrap(),
            ReplCommand::AddNode { x: 1.5, y: -2.0, id: Some("R7".to_string()) }
        );
        assert_eq!(
            parse("/edge N1 N2 3.5").unwrap(),
            ReplCommand::Link {
                a: "N1".to_string(),
                b: "N2".to_string(),
                weight: Some("3.5".to_string())
            }
        );
        assert_eq!(
            parse("  /mode   weighted ").unwrap(),
            ReplCommand::Mode(WeightingMode::Weighted)
        );
        assert_eq!(parse("/log 5").unwrap(), ReplCommand::Log(Some(5)));
        assert_eq!(parse("/q").unwrap(), ReplCommand::Exit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("/node add x 1").is_err());
        assert!(parse("/node add 1").is_err());
        assert!(parse("/route N1").is_err());
        assert!(parse("/mode fastest").is_err());
        assert!(parse("/teleport N1").is_err());
        assert!(parse("route N1 N2").is_err());
    }

    #[test]
    fn test_scenario_through_shell() {
        let mut shell = shell();
        run(
            &mut shell,
            &[
                "/node add 0 0",
                "/node add 10 0",
                "/node add 20 0",
                "/node add 10 10",
                "/edge N1 N2 1",
                "/edge N2 N3 1",
                "/edge N1 N4 5",
                "/edge N4 N3 1",
                "/mode weighted",
                "/route N1 N3",
            ],
        );

        let route = shell.simulation().current_route().unwrap();
        assert_eq!(route.path().unwrap().to_string(), "N1 → N2 → N3");

        run(&mut shell, &["/node rm N2", "/rerun"]);
        let route = shell.simulation().current_route().unwrap();
        assert_eq!(route.path().unwrap().to_string(), "N1 → N4 → N3");
        assert_eq!(route.path().unwrap().total_weight, 6.0);
    }

    #[test]
    fn test_source_dest_and_clear() {
        let mut shell = shell();
        run(
            &mut shell,
            &["/node add 0 0", "/node add 1 0", "/edge N1 N2", "/source N1", "/dest N2"],
        );
        assert!(matches!(
            shell.simulation().route_state(),
            RouteState::RouteComputed { .. }
        ));

        run(&mut shell, &["/clear"]);
        assert_eq!(shell.simulation().route_state(), &RouteState::Idle);
    }

    #[test]
    fn test_rejected_commands_surface_errors() {
        let mut shell = shell();
        run(&mut shell, &["/node add 0 0"]);

        assert!(shell.handle_line("/node add 5 5 N1").is_err());
        assert!(shell.handle_line("/edge N1 N9").is_err());
        assert!(shell.handle_line("/edge N1 N1 2").is_err());
        assert!(shell.handle_line("/dest N1").is_err());
        assert_eq!(shell.simulation().graph().node_count(), 1);

        assert_eq!(shell.handle_line("/rerun").unwrap(), Flow::Continue);
        assert_eq!(shell.handle_line("/exit").unwrap(), Flow::Exit);
    }

    #[test]
    fn test_mode_flag_overrides_config() {
        let shell = Shell::new(Config::default(), Some(WeightingMode::Weighted)).unwrap();
        assert_eq!(shell.mode(), WeightingMode::Weighted);
    }
}
