//! Simulation systems - blast waves, damage, reactants and reactions

pub mod blast;
pub mod context;
pub mod damage;
pub mod engine;
pub mod reactants;
pub mod reactions;

pub use blast::{BlastEvent, BlastRequest, ShellLoad};
pub use context::BlastwaveSimulation;
pub use damage::{
    DamageOutcome, apply_building_damage, apply_part_damage, building_damage_amount,
    part_damage_factor,
};
pub use engine::BlastwaveEngine;
pub use reactants::{FreeReactant, FreeReactantRegistry};
pub use reactions::{ReactionMatcher, consume_stoichiometric};
