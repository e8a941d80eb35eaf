//! Simulation context tying the engine, reactants and reactions together

use blastwave_simulation::{
    ReactionConfig, ReactionLoadReport, ReactionRegistry, ResourceAmount, Resources,
};
use glam::DVec3;

use super::blast::BlastRequest;
use super::engine::BlastwaveEngine;
use super::reactants::FreeReactantRegistry;
use super::reactions::ReactionMatcher;
use crate::config::BlastwaveConfig;
use crate::world::{Atmosphere, BlastStats, BlastWorld, DamageRng, FrameShift};

/// Everything a host needs to run blasts and reactions
///
/// A host calls [`step`](Self::step) once per fixed step and reports
/// destroyed sources through [`spawn_from_source`](Self::spawn_from_source)
/// or [`create_combustion_blast`](Self::create_combustion_blast).
pub struct BlastwaveSimulation {
    config: BlastwaveConfig,
    resources: Resources,
    engine: BlastwaveEngine,
    reactants: FreeReactantRegistry,
    matcher: ReactionMatcher,
}

impl BlastwaveSimulation {
    pub fn new(config: BlastwaveConfig, resources: Resources, reactions: ReactionRegistry) -> Self {
        let engine = BlastwaveEngine::new(&config);
        let reactants = FreeReactantRegistry::new(config.reactants.clone());
        let matcher = ReactionMatcher::new(reactions, config.reactants.overlap_fraction);

        log::info!(
            "Blastwave simulation ready: {} resources, {} reactions, step {} s",
            resources.len(),
            matcher.registry().len(),
            config.fixed_step
        );

        Self {
            config,
            resources,
            engine,
            reactants,
            matcher,
        }
    }

    /// Build the reaction registry from a loaded reaction config
    ///
    /// Invalid entries are skipped and listed in the returned report.
    pub fn from_reaction_config(
        config: BlastwaveConfig,
        resources: Resources,
        reactions: &ReactionConfig,
    ) -> (Self, ReactionLoadReport) {
        let (registry, report) = ReactionRegistry::from_config(reactions, &resources);
        (Self::new(config, resources, registry), report)
    }

    pub fn create_blast<A: Atmosphere + ?Sized>(
        &mut self,
        request: BlastRequest,
        atmosphere: &A,
        stats: &mut dyn BlastStats,
    ) -> bool {
        self.engine.create_blast(request, atmosphere, stats)
    }

    /// Burn the resources of a destroyed source in place
    ///
    /// Yield is the total resource mass times the combustion energy and
    /// efficiency. Returns false when the yield is negligible or the
    /// atmosphere cannot carry a blast.
    pub fn create_combustion_blast<A: Atmosphere + ?Sized>(
        &mut self,
        amounts: &[ResourceAmount],
        position: DVec3,
        atmosphere: &A,
        stats: &mut dyn BlastStats,
    ) -> bool {
        let mass = self.resources.total_mass(amounts);
        let yield_joules = self.config.combustion.yield_for_mass(mass);
        if yield_joules <= self.config.combustion.min_yield {
            return false;
        }
        if atmosphere.sample(position).pressure_kpa <= 0.0 {
            return false;
        }

        log::info!("Combustion of {:.3} kg released {:.3e} J", mass, yield_joules);
        self.engine
            .create_blast(BlastRequest::new(yield_joules, position), atmosphere, stats)
    }

    /// Release reactant bubbles for the reactive resources of a source
    pub fn spawn_from_source(
        &mut self,
        amounts: &[ResourceAmount],
        position: DVec3,
        velocity: DVec3,
    ) -> usize {
        self.reactants.spawn_from_source(
            amounts,
            position,
            velocity,
            &self.resources,
            self.matcher.registry(),
        )
    }

    /// Match overlapping reactants and start their blasts
    ///
    /// Returns the number of blasts started.
    pub fn run_reactions<A: Atmosphere + ?Sized>(
        &mut self,
        atmosphere: &A,
        stats: &mut dyn BlastStats,
    ) -> usize {
        let requests = self
            .matcher
            .run(self.reactants.as_mut_slice(), atmosphere, stats);

        let mut started = 0;
        for request in requests {
            if self.engine.create_blast(request, atmosphere, stats) {
                started += 1;
            }
        }
        started
    }

    /// Move and age reactants by one fixed step
    pub fn tick_reactants(&mut self) -> usize {
        self.reactants.tick(self.config.fixed_step)
    }

    pub fn simulate_tick<W, R>(
        &mut self,
        world: &mut W,
        frame: &FrameShift,
        rng: &mut R,
        stats: &mut dyn BlastStats,
    ) where
        W: BlastWorld + ?Sized,
        R: DamageRng + ?Sized,
    {
        self.engine.simulate_tick(world, frame, rng, stats);
    }

    /// One full fixed step: reactions, reactant aging, then blast propagation
    pub fn step<W, R>(
        &mut self,
        world: &mut W,
        frame: &FrameShift,
        rng: &mut R,
        stats: &mut dyn BlastStats,
    ) where
        W: BlastWorld + ?Sized,
        R: DamageRng + ?Sized,
    {
        self.run_reactions(&*world, stats);
        self.tick_reactants();
        self.engine.simulate_tick(world, frame, rng, stats);
    }

    /// Retire every blast and drop every reactant
    pub fn clear(&mut self) {
        self.engine.clear();
        self.reactants.clear();
        log::debug!("Blastwave simulation cleared");
    }

    pub fn config(&self) -> &BlastwaveConfig {
        &self.config
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn engine(&self) -> &BlastwaveEngine {
        &self.engine
    }

    pub fn reactants(&self) -> &FreeReactantRegistry {
        &self.reactants
    }

    pub fn reactions(&self) -> &ReactionRegistry {
        self.matcher.registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlastCounters, NoopStats, SandboxWorld, UniformAtmosphere};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn simulation() -> BlastwaveSimulation {
        BlastwaveSimulation::new(
            BlastwaveConfig::default(),
            Resources::with_stock_propellants(),
            ReactionRegistry::new(),
        )
    }

    #[test]
    fn test_combustion_blast_from_fuel() {
        let mut sim = simulation();
        let fuel = sim.resources().id_of("LiquidFuel").unwrap();
        let mut stats = BlastCounters::default();

        let created = sim.create_combustion_blast(
            &[ResourceAmount::new(fuel, 1.0)],
            DVec3::ZERO,
            &UniformAtmosphere::sea_level(),
            &mut stats,
        );

        assert!(created);
        let blast = &sim.engine().active_blasts()[0];
        assert!((blast.yield_joules() - 5.0 * 46e6 * 0.15).abs() < 1e-3);
        assert_eq!(stats.blasts_created, 1);
    }

    #[test]
    fn test_combustion_needs_fuel_and_air() {
        let mut sim = simulation();
        let fuel = sim.resources().id_of("LiquidFuel").unwrap();

        assert!(!sim.create_combustion_blast(
            &[],
            DVec3::ZERO,
            &UniformAtmosphere::sea_level(),
            &mut NoopStats
        ));
        assert!(!sim.create_combustion_blast(
            &[ResourceAmount::new(fuel, 1.0)],
            DVec3::ZERO,
            &UniformAtmosphere::vacuum(),
            &mut NoopStats
        ));
        assert_eq!(sim.engine().active_count(), 0);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut sim = simulation();
        let fuel = sim.resources().id_of("LiquidFuel").unwrap();
        let atmosphere = UniformAtmosphere::sea_level();
        sim.create_blast(BlastRequest::new(1e6, DVec3::ZERO), &atmosphere, &mut NoopStats);
        sim.create_combustion_blast(
            &[ResourceAmount::new(fuel, 1.0)],
            DVec3::new(100.0, 0.0, 0.0),
            &atmosphere,
            &mut NoopStats,
        );
        assert_eq!(sim.engine().active_count(), 2);

        sim.clear();
        assert_eq!(sim.engine().active_count(), 0);
        assert_eq!(sim.engine().pool_count(), 32);
        assert!(sim.reactants().is_empty());
    }

    #[test]
    fn test_step_without_anything_is_noop() {
        let mut sim = simulation();
        let mut world = SandboxWorld::default();
        let mut rng = Xoshiro256StarStar::seed_from_u64(0);
        sim.step(&mut world, &FrameShift::default(), &mut rng, &mut NoopStats);
        assert_eq!(sim.engine().active_count(), 0);
    }
}
