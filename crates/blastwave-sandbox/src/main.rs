use std::path::PathBuf;

use anyhow::Context;
use blastwave_sandbox::runner::blast_radii;
use blastwave_sandbox::{
    BUILTIN_SCENARIOS, SandboxConfig, ScenarioDefinition, ScenarioRunner, build_simulation,
    load_reactions, stock_simulation,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: blastwave.ron in the working directory, if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenario to run: a built-in name or a path to a RON scenario file
    #[arg(long, default_value = "launchpad")]
    scenario: String,

    /// Maximum ticks to simulate (overrides scenario and config)
    #[arg(long)]
    ticks: Option<usize>,

    /// Seed for damage rolls (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Reaction set to load instead of the bundled one
    #[arg(long)]
    reactions: Option<PathBuf>,

    /// Write the selected scenario to a RON file instead of running it
    #[arg(long)]
    export: Option<PathBuf>,

    /// List built-in scenarios
    #[arg(long)]
    list_scenarios: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if args.list_scenarios {
        println!("Built-in scenarios:");
        for name in BUILTIN_SCENARIOS {
            if let Some(scenario) = blastwave_sandbox::scenario::builtin(name) {
                println!("  {:<12} {}", name, scenario.description);
            }
        }
        return Ok(());
    }

    let scenario = ScenarioDefinition::resolve(&args.scenario)?;

    if let Some(path) = &args.export {
        scenario.to_file(path)?;
        println!("Wrote scenario '{}' to {}", scenario.name, path.display());
        return Ok(());
    }

    let config = SandboxConfig::load(args.config.as_deref()).context("Failed to load config")?;

    let reactions_path = args.reactions.clone().or(config.run.reactions.clone());
    let (sim, _) = match reactions_path {
        Some(path) => {
            let reactions = load_reactions(&path)?;
            build_simulation(config.simulation.clone(), &reactions)
        }
        None => stock_simulation(config.simulation.clone())?,
    };

    let ticks = args.ticks.or(scenario.ticks).unwrap_or(config.run.ticks);
    let seed = args.seed.unwrap_or(config.run.seed);

    let mut runner = ScenarioRunner::new(sim, seed);
    let report = runner.run(&scenario, ticks)?;

    for (position, radius) in blast_radii(runner.simulation()) {
        log::info!("Blast at {:?} still active, radius {:.1} m", position, radius);
    }

    println!("{}", report.summary());
    Ok(())
}
