//! Headless sandbox for Blastwave
//!
//! Loads the simulation configuration and reaction set, builds a sandbox
//! world from a scenario definition and steps it to completion.

pub mod config;
pub mod runner;
pub mod scenario;

use std::path::Path;

use anyhow::{Context, Result};
use blastwave_core::{BlastwaveConfig, BlastwaveSimulation, ReactionConfig, Resources};
use blastwave_simulation::ReactionLoadReport;

pub use config::{RunConfig, SandboxConfig};
pub use runner::{ScenarioReport, ScenarioRunner};
pub use scenario::{BUILTIN_SCENARIOS, ScenarioAction, ScenarioDefinition, ScheduledAction};

/// Reaction set bundled with the sandbox
pub const STOCK_REACTIONS: &str = include_str!("../assets/reactions.ron");

/// Parse a reaction set from RON text
pub fn parse_reactions(source: &str) -> Result<ReactionConfig> {
    ron::from_str(source).context("Failed to parse reaction config")
}

/// Load a reaction set from a RON file
pub fn load_reactions(path: impl AsRef<Path>) -> Result<ReactionConfig> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read reactions: {}", path.display()))?;
    parse_reactions(&source).with_context(|| format!("In reactions file {}", path.display()))
}

/// Simulation with stock propellants and the given reaction set
///
/// Skipped entries are logged while loading and listed in the report.
pub fn build_simulation(
    config: BlastwaveConfig,
    reactions: &ReactionConfig,
) -> (BlastwaveSimulation, ReactionLoadReport) {
    BlastwaveSimulation::from_reaction_config(
        config,
        Resources::with_stock_propellants(),
        reactions,
    )
}

/// Simulation with stock propellants and the bundled reaction set
pub fn stock_simulation(
    config: BlastwaveConfig,
) -> Result<(BlastwaveSimulation, ReactionLoadReport)> {
    let reactions = parse_reactions(STOCK_REACTIONS)?;
    Ok(build_simulation(config, &reactions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_reactions_load_cleanly() {
        let (sim, report) = stock_simulation(BlastwaveConfig::default()).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.reactants, 3);
        assert_eq!(report.reactions, 3);
        assert_eq!(sim.reactions().len(), 3);
    }

    #[test]
    fn test_build_simulation_reports_skipped_entries() {
        let reactions = parse_reactions(
            r#"(
                reactive_resources: ["LiquidFuel", "Oxidizer", "Kerbalite"],
                reactions: [],
            )"#,
        )
        .unwrap();

        let (sim, report) = build_simulation(BlastwaveConfig::default(), &reactions);
        assert_eq!(report.reactants, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].to_string().contains("Kerbalite"));
        assert!(sim.reactions().is_empty());
    }

    #[test]
    fn test_load_reactions_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reactions.ron");
        std::fs::write(&path, STOCK_REACTIONS).unwrap();

        let config = load_reactions(&path).unwrap();
        assert_eq!(config.reactions.len(), 3);
    }

    #[test]
    fn test_load_reactions_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "( reactions: [ oops").unwrap();
        assert!(load_reactions(&path).is_err());
        assert!(load_reactions(dir.path().join("missing.ron")).is_err());
    }
}
