//! Blast physics data and reaction definitions for Blastwave
//!
//! This crate provides the foundational data types for blast simulation:
//! - Hermite float curves and the Kinney-Graham blast curves (FloatCurve, BlastCurves)
//! - Resource definitions (ResourceId, ResourceDef, Resources)
//! - Explosive reactions and their configuration (ReactionDefinition, ReactionRegistry)

mod curves;
mod reactions;
mod resources;

pub use curves::{BlastCurves, CurveKey, FloatCurve, scaled_distance_samples};
pub use reactions::{
    ReactionConfig, ReactionConfigError, ReactionDefinition, ReactionEntry, ReactionId,
    ReactionLoadReport, ReactionRegistry, ReactantEntry, YieldKey,
};
pub use resources::{ResourceAmount, ResourceDef, ResourceId, Resources};

/// Energy released by one kilogram of TNT (J/kg)
pub const KG_TNT_TO_JOULE: f64 = 4.184e6;

/// Inverse of [`KG_TNT_TO_JOULE`], as used for TNT-equivalent mass (kg/J)
pub const JOULE_TO_KG_TNT: f64 = 2.390e-7;
