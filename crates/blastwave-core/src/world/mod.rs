//! Host world interface, damage randomness and statistics

pub mod environment;
pub mod rng_trait;
pub mod sandbox;
pub mod stats;

pub use environment::{
    Atmosphere, AtmosphereSample, BlastWorld, DamageableBuilding, DamageablePart, FrameShift,
    JointStrength,
};
pub use rng_trait::DamageRng;
pub use sandbox::{
    PartState, SandboxBuilding, SandboxPart, SandboxVessel, SandboxWorld, UniformAtmosphere,
};
pub use stats::{BlastCounters, BlastStats, NoopStats};
