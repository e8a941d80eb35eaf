//! Host world interface
//!
//! The simulation never owns vessels, parts or buildings. The host exposes
//! them through these traits, along with the atmosphere at any position and
//! the per-tick reference frame shift.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Ambient conditions at a world position
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereSample {
    /// Static pressure (kPa)
    pub pressure_kpa: f64,
    /// Speed of sound (m/s)
    pub sound_speed: f64,
    /// Ratio of specific heats
    pub adiabatic_index: f64,
    /// Whether the atmosphere contains free oxygen
    pub oxygen: bool,
}

impl AtmosphereSample {
    pub const VACUUM: Self = Self {
        pressure_kpa: 0.0,
        sound_speed: 0.0,
        adiabatic_index: 1.4,
        oxygen: false,
    };

    /// Standard sea-level air
    pub fn sea_level() -> Self {
        Self {
            pressure_kpa: 101.325,
            sound_speed: 340.29,
            adiabatic_index: 1.4,
            oxygen: true,
        }
    }

    /// A blast can only propagate through positive, finite pressure and sound speed
    pub fn supports_blast(&self) -> bool {
        self.pressure_kpa.is_finite()
            && self.sound_speed.is_finite()
            && self.pressure_kpa > 0.0
            && self.sound_speed > 0.0
    }
}

/// Source of ambient conditions
pub trait Atmosphere {
    fn sample(&self, position: DVec3) -> AtmosphereSample;
}

/// Reference frame change since the previous tick
///
/// `origin_delta` is the floating-origin offset change; `frame_velocity` is
/// the velocity of the moving reference frame, integrated over the step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameShift {
    pub origin_delta: DVec3,
    pub frame_velocity: DVec3,
}

impl FrameShift {
    pub fn new(origin_delta: DVec3, frame_velocity: DVec3) -> Self {
        Self {
            origin_delta,
            frame_velocity,
        }
    }

    /// Displacement to apply to world positions over one step
    pub fn displacement(&self, dt: f64) -> DVec3 {
        self.origin_delta - self.frame_velocity * dt
    }
}

/// Breaking limits of the joint holding a part to its parent
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointStrength {
    pub breaking_force: f64,
    pub breaking_torque: f64,
}

impl JointStrength {
    pub fn new(breaking_force: f64, breaking_torque: f64) -> Self {
        Self {
            breaking_force,
            breaking_torque,
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.breaking_force *= factor;
        self.breaking_torque *= factor;
    }
}

/// A vessel part that blasts can push, weaken, detach or destroy
pub trait DamageablePart {
    fn position(&self) -> DVec3;

    /// Cross-sectional area presented to a wave travelling along `direction` (m²)
    fn projected_area(&self, direction: DVec3) -> f64;

    fn crash_tolerance(&self) -> f64;

    /// Joint to the parent part, `None` for root or detached parts
    fn joint_mut(&mut self) -> Option<&mut JointStrength>;

    fn detach(&mut self);

    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool {
        false
    }

    fn apply_impulse(&mut self, impulse: DVec3);
}

/// An extended structure that accumulates blast damage
pub trait DamageableBuilding {
    fn position(&self) -> DVec3;

    /// Impact momentum the structure tolerates without damage
    fn impact_threshold(&self) -> f64;

    fn add_damage(&mut self, amount: f64);
}

/// Everything a blast can affect, plus the atmosphere it travels through
pub trait BlastWorld: Atmosphere {
    type Part: DamageablePart;
    type Building: DamageableBuilding;

    fn vessel_count(&self) -> usize;

    /// Reference position used for broad-phase culling
    fn vessel_position(&self, vessel: usize) -> DVec3;

    fn vessel_parts_mut(&mut self, vessel: usize) -> &mut [Self::Part];

    fn buildings_mut(&mut self) -> &mut [Self::Building];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vacuum_does_not_support_blast() {
        assert!(!AtmosphereSample::VACUUM.supports_blast());
        assert!(AtmosphereSample::sea_level().supports_blast());
    }

    #[test]
    fn test_non_finite_atmosphere_does_not_support_blast() {
        let sample = AtmosphereSample {
            pressure_kpa: f64::NAN,
            ..AtmosphereSample::sea_level()
        };
        assert!(!sample.supports_blast());

        let sample = AtmosphereSample {
            sound_speed: -1.0,
            ..AtmosphereSample::sea_level()
        };
        assert!(!sample.supports_blast());
    }

    #[test]
    fn test_frame_shift_displacement() {
        let shift = FrameShift::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 50.0, 0.0));
        let d = shift.displacement(0.5);
        assert_eq!(d, DVec3::new(10.0, -25.0, 0.0));
        assert_eq!(FrameShift::default().displacement(0.02), DVec3::ZERO);
    }

    #[test]
    fn test_joint_scale() {
        let mut joint = JointStrength::new(100.0, 40.0);
        joint.scale(0.75);
        assert_eq!(joint, JointStrength::new(75.0, 30.0));
    }
}
