//! Blast-wave physics and explosive reactions for Blastwave
//!
//! This crate implements:
//! - Predictor-corrector blast-wave propagation with pooling and coalescence
//! - Graduated structural damage for parts and buildings
//! - Free reactant bubbles and stoichiometric reaction matching
//! - Host world traits plus a simple sandbox world implementation

pub mod config;
pub mod simulation;
pub mod world;

pub use config::{BlastTunables, BlastwaveConfig, CombustionTunables, ConfigError, ReactantTunables};
pub use simulation::{
    BlastEvent, BlastRequest, BlastwaveEngine, BlastwaveSimulation, DamageOutcome, FreeReactant,
    FreeReactantRegistry, ReactionMatcher, ShellLoad,
};
pub use world::{
    Atmosphere, AtmosphereSample, BlastCounters, BlastStats, BlastWorld, DamageRng,
    DamageableBuilding, DamageablePart, FrameShift, JointStrength, NoopStats, PartState,
    SandboxBuilding, SandboxPart, SandboxVessel, SandboxWorld, UniformAtmosphere,
};

// Data types from blastwave-simulation
pub use blastwave_simulation::{
    BlastCurves, KG_TNT_TO_JOULE, ReactionConfig, ReactionRegistry, ResourceAmount, ResourceId,
    Resources,
};
