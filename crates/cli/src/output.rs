//! Output formatting and terminal rendering
//!
//! Handles colored terminal output for routes, tables and the event log.

use colored::Colorize;
use routesim::{
    Edge, InvariantViolation, LogEntry, Node, RouteOutcome, TopologySummary,
    ViolationSeverity, WeightingMode,
};

/// Format a weight at full precision ("2", "0.5", "0.0004"); negative zero
/// prints as "0"
pub fn format_weight(weight: f64) -> String {
    if weight == 0.0 {
        "0".to_string()
    } else {
        weight.to_string()
    }
}

/// Output handler for terminal display
pub struct OutputHandler {
    pub show_coordinates: bool,
}

impl OutputHandler {
    pub fn new(show_coordinates: bool) -> Self {
        Self { show_coordinates }
    }

    /// Print the welcome banner
    pub fn print_banner(&self, mode: WeightingMode) {
        println!();
        println!(
            "{}",
            "╔═══════════════════════════════════════════════════════════════╗".bright_cyan()
        );
        println!(
            "{}",
            "║             routesim - network routing simulator              ║".bright_cyan()
        );
        println!(
            "{}",
            "╠═══════════════════════════════════════════════════════════════╣".bright_cyan()
        );
        println!(
            "{}  Mode: {:<54}{}",
            "║".bright_cyan(),
            mode.to_string().bright_white(),
            "║".bright_cyan()
        );
        println!(
            "{}  {}                     {}",
            "║".bright_cyan(),
            "Build a topology, then /route <src> <dst>".dimmed(),
            "║".bright_cyan()
        );
        println!(
            "{}  {}                          {}",
            "║".bright_cyan(),
            "Use /help for the list of commands".dimmed(),
            "║".bright_cyan()
        );
        println!(
            "{}",
            "╚═══════════════════════════════════════════════════════════════╝".bright_cyan()
        );
        println!();
    }

    /// Print a section header
    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", format!("▶ {}", text).bright_yellow().bold());
        println!("{}", "─".repeat(60).dimmed());
    }

    /// Print a success message
    pub fn print_success(&self, text: &str) {
        println!("{} {}", "✓".bright_green(), text.bright_white());
    }

    /// Print an error message
    pub fn print_error(&self, text: &str) {
        println!("{} {}", "✗".bright_red(), text.bright_red());
    }

    /// Print a warning message
    pub fn print_warning(&self, text: &str) {
        println!("{} {}", "⚠".bright_yellow(), text.yellow());
    }

    /// Print an info message
    pub fn print_info(&self, text: &str) {
        println!("{} {}", "ℹ".bright_blue(), text);
    }

    /// Print a route result
    pub fn print_route(&self, outcome: &RouteOutcome, mode: WeightingMode) {
        match outcome {
            RouteOutcome::Found(path) => {
                println!(
                    "{} {}  {}",
                    "⇢".bright_green(),
                    path.to_string().bright_white().bold(),
                    format!(
                        "({} hops, weight {}, {})",
                        path.hops(),
                        format_weight(path.total_weight),
                        mode
                    )
                    .dimmed()
                );
            }
            RouteOutcome::NoPath { from, to } => {
                println!(
                    "{} {}",
                    "⇢".bright_red(),
                    format!("No path from {} to {} ({})", from, to, mode).bright_red()
                );
            }
        }
    }

    /// Print the nodes table
    pub fn print_nodes_table<'a>(&self, nodes: impl Iterator<Item = (&'a Node, usize)>) {
        println!();
        let header = if self.show_coordinates {
            format!("{:<12} {:>10} {:>10} {:>8}", "ID", "X", "Y", "Links")
        } else {
            format!("{:<12} {:>8}", "ID", "Links")
        };
        println!("{}", header.bright_white().bold());
        println!("{}", "─".repeat(header.chars().count()).dimmed());

        for (node, degree) in nodes {
            if self.show_coordinates {
                println!(
                    "{:<12} {:>10.1} {:>10.1} {:>8}",
                    node.id.bright_cyan(),
                    node.x,
                    node.y,
                    degree
                );
            } else {
                println!("{:<12} {:>8}", node.id.bright_cyan(), degree);
            }
        }
        println!();
    }

    /// Print the outgoing links of a node
    pub fn print_edges(&self, id: &str, edges: &[Edge]) {
        if edges.is_empty() {
            self.print_info(&format!("{} has no links.", id));
            return;
        }
        for edge in edges {
            println!(
                "  {} {} {}  {}",
                edge.from.bright_cyan(),
                "↔".dimmed(),
                edge.to.bright_cyan(),
                format!("w={}", format_weight(edge.weight)).bright_yellow()
            );
        }
    }

    /// Print event log entries
    pub fn print_log<'a>(&self, entries: impl Iterator<Item = &'a LogEntry>) {
        let mut empty = true;
        for entry in entries {
            empty = false;
            let label = format!("{:<14}", entry.label());
            let label = match entry.source.as_str() {
                "Error" => label.bright_red(),
                "Sim" => label.bright_green(),
                "Graph" => label.bright_cyan(),
                _ => label.bright_blue(),
            };
            println!(
                "{}  {} {}",
                entry.time.format("%H:%M:%S").to_string().dimmed(),
                label,
                entry.detail
            );
        }
        if empty {
            self.print_info("Event log is empty.");
        }
    }

    /// Print invariant check results
    pub fn print_violations(&self, violations: &[InvariantViolation]) {
        if violations.is_empty() {
            self.print_success("All topology invariants hold.");
            return;
        }
        for v in violations {
            let severity = match v.severity {
                ViolationSeverity::Info => "info".bright_blue(),
                ViolationSeverity::Warning => "warning".bright_yellow(),
                ViolationSeverity::Error => "error".bright_red(),
                ViolationSeverity::Critical => "critical".red().bold(),
            };
            println!("{} [{}] {}", severity, v.invariant_name.dimmed(), v.message);
            if let Some(fix) = &v.suggested_fix {
                println!("    {} {}", "fix:".dimmed(), fix);
            }
        }
    }

    /// Print a one-line topology summary
    pub fn print_summary(&self, summary: &TopologySummary, mode: WeightingMode) {
        println!(
            "  {} {} | {} {} | {} {} | {} {}",
            "Nodes:".dimmed(),
            summary.node_count.to_string().bright_white(),
            "Links:".dimmed(),
            summary.link_count.to_string().bright_white(),
            "Isolated:".dimmed(),
            summary.isolated_nodes.to_string().bright_yellow(),
            "Mode:".dimmed(),
            mode.to_string().bright_cyan()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(2.0), "2");
        assert_eq!(format_weight(0.5), "0.5");
        assert_eq!(format_weight(1.25), "1.25");
        assert_eq!(format_weight(0.0), "0");
        assert_eq!(format_weight(10.0), "10");
        assert_eq!(format_weight(-3.0), "-3");
    }

    #[test]
    fn test_format_weight_keeps_small_values() {
        assert_eq!(format_weight(0.0004), "0.0004");
        assert_eq!(format_weight(-0.0004), "-0.0004");
        assert_eq!(format_weight(-0.0), "0");
        assert_eq!(format_weight(f64::INFINITY), "inf");
    }
}
