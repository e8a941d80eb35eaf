//! Simulation tunables
//!
//! Every field has a default, so a RON document only needs to name the
//! values it overrides:
//!
//! ```ron
//! (
//!     fixed_step: 0.01,
//!     blast: (max_radius: 10000.0),
//! )
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse blastwave config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize blastwave config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Root configuration of a [`crate::BlastwaveSimulation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlastwaveConfig {
    /// Fixed simulation step (seconds)
    #[serde(default = "default_fixed_step")]
    pub fixed_step: f64,

    #[serde(default)]
    pub blast: BlastTunables,

    #[serde(default)]
    pub reactants: ReactantTunables,

    #[serde(default)]
    pub combustion: CombustionTunables,
}

fn default_fixed_step() -> f64 {
    0.02
}

impl Default for BlastwaveConfig {
    fn default() -> Self {
        Self {
            fixed_step: default_fixed_step(),
            blast: BlastTunables::default(),
            reactants: ReactantTunables::default(),
            combustion: CombustionTunables::default(),
        }
    }
}

impl BlastwaveConfig {
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

/// Blast-wave engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlastTunables {
    /// Events kept preallocated in the inactive pool
    pub baseline_pool_size: usize,
    /// Yield at or below which an event is spent (J)
    pub spent_yield: f64,
    /// Radius past which an event is retired (m)
    pub max_radius: f64,
    /// Retire once the wave slows below this multiple of the sound speed
    pub completion_mach: f64,
    /// Vessel broad-phase margin, in wave-velocity multiples of one second
    pub vessel_margin_factor: f64,
    /// Two events may merge once both radii exceed this multiple of their separation
    pub coalescence_distance_factor: f64,
    /// Maximum relative radius difference for a merge
    pub coalescence_radius_tolerance: f64,
}

impl Default for BlastTunables {
    fn default() -> Self {
        Self {
            baseline_pool_size: 32,
            spent_yield: 0.001,
            max_radius: 25_000.0,
            completion_mach: 1.001,
            vessel_margin_factor: 3.0,
            coalescence_distance_factor: 10.0,
            coalescence_radius_tolerance: 0.05,
        }
    }
}

/// Free reactant bubble settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactantTunables {
    /// Seconds before a bubble expires
    pub lifetime: f64,
    /// Volume of one resource unit (m³)
    pub litre_volume: f64,
    /// Bubbles react when closer than this fraction of their summed radii
    pub overlap_fraction: f64,
}

impl Default for ReactantTunables {
    fn default() -> Self {
        Self {
            lifetime: 1.0,
            litre_volume: 0.001,
            overlap_fraction: 0.9,
        }
    }
}

/// Combustion of resources released by destroyed parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombustionTunables {
    /// Chemical energy per kilogram of resource (J/kg)
    pub specific_energy: f64,
    /// Fraction of the chemical energy released as blast
    pub efficiency: f64,
    /// Smallest yield worth simulating (J)
    pub min_yield: f64,
}

impl Default for CombustionTunables {
    fn default() -> Self {
        Self {
            specific_energy: 46e6,
            efficiency: 0.15,
            min_yield: 0.01,
        }
    }
}

impl CombustionTunables {
    /// Blast yield released by burning `mass` kilograms (J)
    pub fn yield_for_mass(&self, mass: f64) -> f64 {
        mass * self.specific_energy * self.efficiency
    }
}
