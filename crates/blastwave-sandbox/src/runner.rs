//! Scenario execution against a sandbox world

use anyhow::{Result, bail};
use blastwave_core::{
    BlastCounters, BlastRequest, BlastwaveSimulation, KG_TNT_TO_JOULE, PartState, ResourceAmount,
    Resources, SandboxWorld,
};
use glam::DVec3;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::Serialize;

use crate::scenario::{ScenarioAction, ScenarioDefinition};

/// Outcome of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario_name: String,
    pub ticks_run: usize,
    pub counters: BlastCounters,
    pub parts_total: usize,
    pub parts_detached: usize,
    pub parts_destroyed: usize,
    pub building_damage: Vec<(String, f64)>,
    /// Blasts still propagating when the run stopped
    pub active_blasts: usize,
}

impl ScenarioReport {
    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Scenario '{}' ran {} ticks", self.scenario_name, self.ticks_run),
            format!(
                "Blasts: {} created, {} merged, {} retired, {} still active",
                self.counters.blasts_created,
                self.counters.coalescences,
                self.counters.blasts_retired,
                self.active_blasts
            ),
            format!("Reactions: {}", self.counters.reactions),
            format!(
                "Parts: {} total, {} detached, {} destroyed",
                self.parts_total, self.parts_detached, self.parts_destroyed
            ),
        ];
        for (name, damage) in &self.building_damage {
            lines.push(format!("Building '{}': {:.1} damage", name, damage));
        }
        lines.join("\n")
    }
}

/// Runs a scenario tick by tick
pub struct ScenarioRunner {
    sim: BlastwaveSimulation,
    rng: Xoshiro256StarStar,
    stats: BlastCounters,
}

impl ScenarioRunner {
    pub fn new(sim: BlastwaveSimulation, seed: u64) -> Self {
        Self {
            sim,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            stats: BlastCounters::default(),
        }
    }

    /// Run `scenario` for `ticks` steps, stopping early once nothing is left
    /// to simulate
    ///
    /// The world moves with the scenario's frame shift each tick, and action
    /// positions follow it.
    pub fn run(&mut self, scenario: &ScenarioDefinition, ticks: usize) -> Result<ScenarioReport> {
        let mut world = scenario.world.clone();
        let last_action = scenario.actions.iter().map(|a| a.tick).max().unwrap_or(0);

        log::info!("Running scenario '{}': {}", scenario.name, scenario.description);

        let frame = scenario.frame_shift;
        let displacement = frame.displacement(self.sim.config().fixed_step);
        let mut origin_offset = DVec3::ZERO;

        let mut ticks_run = 0;
        for tick in 0..ticks {
            for scheduled in scenario.actions.iter().filter(|a| a.tick == tick) {
                self.apply(&scheduled.action, origin_offset, &world)?;
            }

            world.translate(displacement);
            origin_offset += displacement;

            self.sim.step(&mut world, &frame, &mut self.rng, &mut self.stats);
            ticks_run += 1;

            let idle = self.sim.engine().active_count() == 0 && self.sim.reactants().is_empty();
            if tick >= last_action && idle {
                log::debug!("Scenario '{}' settled after {} ticks", scenario.name, ticks_run);
                break;
            }
        }

        let parts = world.vessels.iter().flat_map(|v| v.parts.iter());
        let count_state = |state: PartState| parts.clone().filter(|p| p.state == state).count();

        Ok(ScenarioReport {
            scenario_name: scenario.name.clone(),
            ticks_run,
            counters: self.stats,
            parts_total: parts.clone().count(),
            parts_detached: count_state(PartState::Detached),
            parts_destroyed: count_state(PartState::Destroyed),
            building_damage: world
                .buildings
                .iter()
                .map(|b| (b.name.clone(), b.damage))
                .collect(),
            active_blasts: self.sim.engine().active_count(),
        })
    }

    fn apply(
        &mut self,
        action: &ScenarioAction,
        origin_offset: DVec3,
        world: &SandboxWorld,
    ) -> Result<()> {
        match action {
            ScenarioAction::Detonate { tnt_kg, position } => {
                let position = *position + origin_offset;
                let request = BlastRequest::new(tnt_kg * KG_TNT_TO_JOULE, position);
                if !self.sim.create_blast(request, world, &mut self.stats) {
                    log::warn!("Detonation at {:?} did not start a blast", position);
                }
            }
            ScenarioAction::Combust {
                resources,
                position,
            } => {
                let position = *position + origin_offset;
                let amounts = resolve_amounts(self.sim.resources(), resources)?;
                if !self
                    .sim
                    .create_combustion_blast(&amounts, position, world, &mut self.stats)
                {
                    log::warn!("Combustion at {:?} did not start a blast", position);
                }
            }
            ScenarioAction::Release {
                resources,
                position,
                velocity,
            } => {
                let position = *position + origin_offset;
                let amounts = resolve_amounts(self.sim.resources(), resources)?;
                let spawned = self.sim.spawn_from_source(&amounts, position, *velocity);
                log::info!("Released {} reactant bubbles at {:?}", spawned, position);
            }
        }
        Ok(())
    }

    pub fn simulation(&self) -> &BlastwaveSimulation {
        &self.sim
    }
}

fn resolve_amounts(resources: &Resources, named: &[(String, f64)]) -> Result<Vec<ResourceAmount>> {
    named
        .iter()
        .map(|(name, amount)| match resources.id_of(name) {
            Some(id) => Ok(ResourceAmount::new(id, *amount)),
            None => bail!("Unknown resource '{}' in scenario", name),
        })
        .collect()
}

/// Radius reached by every active blast, for progress output
pub fn blast_radii(sim: &BlastwaveSimulation) -> Vec<(DVec3, f64)> {
    sim.engine()
        .active_blasts()
        .iter()
        .map(|b| (b.position(), b.radius()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ScheduledAction, builtin};
    use crate::stock_simulation;
    use blastwave_core::{BlastwaveConfig, FrameShift};

    fn runner() -> ScenarioRunner {
        let (sim, _) = stock_simulation(BlastwaveConfig::default()).unwrap();
        ScenarioRunner::new(sim, 7)
    }

    #[test]
    fn test_launchpad_destroys_rocket() {
        let scenario = builtin("launchpad").unwrap();
        let report = runner().run(&scenario, 2000).unwrap();

        assert_eq!(report.counters.blasts_created, 1);
        assert_eq!(report.counters.blasts_retired, 1);
        assert_eq!(report.active_blasts, 0);
        assert!(report.parts_destroyed >= 6);
        assert!(report.building_damage[0].1 > 0.0);
        assert!(report.ticks_run < 2000);
    }

    #[test]
    fn test_cluster_merges() {
        let scenario = builtin("cluster").unwrap();
        let report = runner().run(&scenario, 2000).unwrap();
        assert_eq!(report.counters.blasts_created, 4);
        assert_eq!(report.counters.coalescences, 3);
        assert_eq!(report.counters.blasts_retired, 4);
    }

    #[test]
    fn test_fuel_spill_reacts() {
        let scenario = builtin("fuel_spill").unwrap();
        let report = runner().run(&scenario, 2000).unwrap();
        assert_eq!(report.counters.reactions, 1);
        assert_eq!(report.counters.blasts_created, 1);
    }

    #[test]
    fn test_vacuum_is_quiet() {
        let scenario = builtin("vacuum").unwrap();
        let report = runner().run(&scenario, 50).unwrap();
        assert_eq!(report.counters.blasts_created, 0);
        assert_eq!(report.parts_destroyed, 0);
        assert_eq!(report.ticks_run, 1);
    }

    #[test]
    fn test_empty_charge_leaves_world_untouched() {
        let mut scenario = builtin("launchpad").unwrap();
        scenario.actions = vec![ScheduledAction {
            tick: 0,
            action: ScenarioAction::Detonate {
                tnt_kg: 0.0,
                position: DVec3::new(0.0, 0.0, 5.0),
            },
        }];

        let report = runner().run(&scenario, 100).unwrap();
        assert_eq!(report.counters.blasts_created, 0);
        assert_eq!(report.parts_destroyed, 0);
        assert_eq!(report.parts_detached, 0);
        assert!(report.building_damage.iter().all(|(_, damage)| *damage == 0.0));
        assert_eq!(report.ticks_run, 1);
    }

    #[test]
    fn test_floating_origin_does_not_change_outcome() {
        let scenario = builtin("launchpad").unwrap();
        let mut shifted = scenario.clone();
        shifted.frame_shift =
            FrameShift::new(DVec3::new(0.5, 0.0, 0.0), DVec3::new(0.0, 0.0, 25.0));
        // move the charge to tick 3 so it starts after the world has drifted
        for scheduled in &mut shifted.actions {
            scheduled.tick = 3;
        }
        let mut delayed = scenario.clone();
        delayed.actions = shifted.actions.clone();

        let still = runner().run(&delayed, 2000).unwrap();
        let moving = runner().run(&shifted, 2000).unwrap();

        assert_eq!(moving.ticks_run, still.ticks_run);
        assert_eq!(moving.counters.blasts_retired, 1);
        assert!(moving.parts_destroyed >= 6);
        let (still_tower, moving_tower) = (still.building_damage[0].1, moving.building_damage[0].1);
        assert!(moving_tower > 0.0);
        assert!((moving_tower - still_tower).abs() <= 1e-6 * still_tower);
    }

    #[test]
    fn test_unknown_resource_is_error() {
        let mut scenario = builtin("vacuum").unwrap();
        scenario.actions = vec![ScheduledAction {
            tick: 0,
            action: ScenarioAction::Combust {
                resources: vec![("Kerbalite".to_string(), 1.0)],
                position: DVec3::ZERO,
            },
        }];
        assert!(runner().run(&scenario, 10).is_err());
    }
}
