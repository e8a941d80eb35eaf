//! Overpressure-impulse damage model
//!
//! Damage grows with the product of how far the applied impulse and
//! overpressure exceed their no-damage thresholds, normalized by the same
//! product at total destruction. Thresholds scale with the toughness of the
//! object being hit.

use glam::DVec3;

use crate::world::{DamageRng, DamageableBuilding, DamageablePart};

/// Impulse below which nothing is damaged (kPa·s)
pub const NO_DAMAGE_IMPULSE: f64 = 0.0689476;
/// Overpressure below which nothing is damaged (kPa)
pub const NO_DAMAGE_OVERPRESSURE: f64 = 5.5;
/// Impulse that levels a reference structure (kPa·s)
pub const TOTAL_DESTRUCTION_IMPULSE: f64 = 0.4826333;
/// Overpressure that levels a reference structure (kPa)
pub const TOTAL_DESTRUCTION_OVERPRESSURE: f64 = 27.579;
pub const TOTAL_DESTRUCTION_LEVEL: f64 = (TOTAL_DESTRUCTION_IMPULSE - NO_DAMAGE_IMPULSE)
    * (TOTAL_DESTRUCTION_OVERPRESSURE - NO_DAMAGE_OVERPRESSURE);

pub const CRASH_TOLERANCE_SCALE: f64 = 0.1;
pub const BUILDING_DAMAGE_SCALE: f64 = 0.25;
const BUILDING_DAMAGE_PER_LEVEL: f64 = 1000.0;

const WEAKEN_LIMIT: f64 = 0.4;
const DETACH_LIMIT: f64 = 0.8;
const HEAVY_JOINT_FACTOR: f64 = 0.75;

/// What a blast did to a part
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    Unaffected,
    Weakened,
    Detached,
    Destroyed,
}

/// Product of the threshold offsets, negative unless both are exceeded
fn offset_product(impulse: f64, overpressure: f64, scaling: f64) -> f64 {
    let impulse_offset = impulse - NO_DAMAGE_IMPULSE * scaling;
    let overpressure_offset = overpressure - NO_DAMAGE_OVERPRESSURE * scaling;
    let product = impulse_offset * overpressure_offset;
    if impulse_offset < 0.0 && overpressure_offset < 0.0 {
        -product
    } else {
        product
    }
}

/// Normalized damage factor for a part; 1.0 is certain destruction
pub fn part_damage_factor(impulse: f64, overpressure: f64, crash_tolerance: f64) -> f64 {
    let scaling = crash_tolerance * CRASH_TOLERANCE_SCALE;
    let factor = offset_product(impulse, overpressure, scaling) / TOTAL_DESTRUCTION_LEVEL / scaling;
    if factor.is_nan() { 0.0 } else { factor }
}

/// Apply blast load to a part
///
/// Light loads weaken the parent joint, moderate loads may break it, and
/// heavy loads break it and may destroy the part outright.
pub fn apply_part_damage<P, R>(
    part: &mut P,
    impulse: f64,
    overpressure: f64,
    rng: &mut R,
) -> DamageOutcome
where
    P: DamageablePart + ?Sized,
    R: DamageRng + ?Sized,
{
    let factor = part_damage_factor(impulse, overpressure, part.crash_tolerance());

    if factor <= 0.0 {
        return DamageOutcome::Unaffected;
    }
    if factor > 1.0 {
        part.destroy();
        return DamageOutcome::Destroyed;
    }

    if factor < WEAKEN_LIMIT {
        return match part.joint_mut() {
            Some(joint) => {
                joint.scale(1.0 - 0.25 * factor);
                DamageOutcome::Weakened
            }
            None => DamageOutcome::Unaffected,
        };
    }

    let had_joint = match part.joint_mut() {
        Some(joint) => {
            joint.scale(HEAVY_JOINT_FACTOR);
            true
        }
        None => false,
    };

    if factor < DETACH_LIMIT {
        if rng.check_probability(2.5 * factor - 1.0) {
            part.detach();
            DamageOutcome::Detached
        } else if had_joint {
            DamageOutcome::Weakened
        } else {
            DamageOutcome::Unaffected
        }
    } else {
        part.detach();
        if rng.check_probability(5.0 * factor - 4.0) {
            part.destroy();
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Detached
        }
    }
}

/// Damage a building accumulates from one blast load, if any
pub fn building_damage_amount(impulse: f64, overpressure: f64, impact_threshold: f64) -> Option<f64> {
    let scaling = impact_threshold * BUILDING_DAMAGE_SCALE;
    let product = offset_product(impulse, overpressure, scaling);
    let factor = product / TOTAL_DESTRUCTION_LEVEL;
    (factor > 0.0 && factor.is_finite()).then_some(product * BUILDING_DAMAGE_PER_LEVEL)
}

/// Apply blast load to a building; returns whether any damage was added
pub fn apply_building_damage<B>(building: &mut B, impulse: f64, overpressure: f64) -> bool
where
    B: DamageableBuilding + ?Sized,
{
    match building_damage_amount(impulse, overpressure, building.impact_threshold()) {
        Some(amount) => {
            building.add_damage(amount);
            true
        }
        None => false,
    }
}

/// Impulse vector pushing a part of `area` along `direction`
pub fn directional_impulse(direction: DVec3, area: f64, impulse: f64) -> DVec3 {
    direction * (area * impulse)
}
