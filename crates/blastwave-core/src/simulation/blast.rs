//! A single spherical blast wave
//!
//! The wave front is tracked as a radius growing at the Rankine-Hugoniot
//! shock velocity. Peak overpressure and positive impulse at the front come
//! from the empirical curves evaluated at the current scaled distance.

use blastwave_simulation::{BlastCurves, JOULE_TO_KG_TNT};
use glam::DVec3;

use crate::config::BlastTunables;
use crate::world::AtmosphereSample;

/// Parameters for a new blast
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlastRequest {
    /// Released energy (J)
    pub yield_joules: f64,
    pub position: DVec3,
    /// Cap on the overpressure above ambient (kPa)
    pub max_overpressure_kpa: f64,
    pub impulse_factor: f64,
}

impl BlastRequest {
    pub fn new(yield_joules: f64, position: DVec3) -> Self {
        Self {
            yield_joules,
            position,
            max_overpressure_kpa: f64::INFINITY,
            impulse_factor: 1.0,
        }
    }

    pub fn with_max_overpressure(mut self, max_overpressure_kpa: f64) -> Self {
        self.max_overpressure_kpa = max_overpressure_kpa;
        self
    }

    pub fn with_impulse_factor(mut self, impulse_factor: f64) -> Self {
        self.impulse_factor = impulse_factor;
        self
    }
}

/// Load felt at a distance swept by the front during the last step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShellLoad {
    /// Overpressure above ambient (kPa)
    pub overpressure: f64,
    /// Positive phase impulse (kPa·s)
    pub impulse: f64,
}

#[derive(Clone, Debug)]
pub struct BlastEvent {
    yield_joules: f64,
    tnt_mass: f64,
    /// TNT mass to the power -1/3, turns radius into scaled distance
    inv_cube_root: f64,
    position: DVec3,

    ambient_pressure: f64,
    sound_speed: f64,
    adiabatic_index: f64,

    prev_radius: f64,
    prev_peak_pressure: f64,
    prev_impulse: f64,

    radius: f64,
    /// Absolute peak pressure at the front (kPa)
    peak_pressure: f64,
    impulse: f64,
    velocity: f64,
    /// Whether the last step resolved pressure and impulse at the front
    shell_resolved: bool,

    max_overpressure: f64,
    impulse_factor: f64,

    /// Separation from every active event when this one was created,
    /// indexed like the engine's active list
    pub(crate) peer_distances: Vec<f64>,
}

impl BlastEvent {
    pub(crate) fn new() -> Self {
        Self {
            yield_joules: 0.0,
            tnt_mass: 0.0,
            inv_cube_root: 0.0,
            position: DVec3::ZERO,
            ambient_pressure: 0.0,
            sound_speed: 0.0,
            adiabatic_index: 1.4,
            prev_radius: 0.0,
            prev_peak_pressure: 0.0,
            prev_impulse: 0.0,
            radius: 0.0,
            peak_pressure: 0.0,
            impulse: 0.0,
            velocity: 0.0,
            shell_resolved: false,
            max_overpressure: f64::INFINITY,
            impulse_factor: 1.0,
            peer_distances: Vec::new(),
        }
    }

    /// Reset this event for a new blast
    ///
    /// Returns false, leaving the event inert, when the atmosphere cannot
    /// carry a blast wave or the yield is not a finite non-negative energy.
    pub(crate) fn initiate(
        &mut self,
        request: &BlastRequest,
        ambient: &AtmosphereSample,
        curves: &BlastCurves,
    ) -> bool {
        self.set_yield(request.yield_joules);
        self.position = request.position;
        self.ambient_pressure = ambient.pressure_kpa;
        self.sound_speed = ambient.sound_speed;
        self.adiabatic_index = ambient.adiabatic_index;
        self.peer_distances.clear();

        if !ambient.supports_blast() {
            return false;
        }
        if !(request.yield_joules >= 0.0 && request.yield_joules.is_finite()) {
            log::warn!(
                "Rejected blast with invalid yield {} J at {:?}",
                request.yield_joules,
                request.position
            );
            return false;
        }

        self.max_overpressure = request.max_overpressure_kpa;
        self.impulse_factor = request.impulse_factor;

        self.radius = 0.0;
        self.velocity = 0.0;
        self.shell_resolved = true;
        self.peak_pressure =
            (curves.peak_overpressure() * self.ambient_pressure).min(self.max_overpressure)
                + self.ambient_pressure;
        self.impulse = curves.peak_impulse() * self.ambient_pressure * self.impulse_factor;

        self.prev_radius = 0.0;
        self.prev_peak_pressure = self.peak_pressure;
        self.prev_impulse = self.impulse;
        true
    }

    /// Move the front forward by one step with a predictor-corrector scheme
    pub(crate) fn advance(&mut self, dt: f64, curves: &BlastCurves) {
        self.prev_radius = self.radius;
        self.prev_peak_pressure = self.peak_pressure;
        self.prev_impulse = self.impulse;

        // predictor
        let first_estimate = self.wave_velocity();
        self.radius = self.prev_radius + first_estimate * dt;
        let predicted = self.recompute_shell(curves);

        // corrector
        self.velocity = 0.5 * (first_estimate + self.wave_velocity());
        self.radius = self.prev_radius + self.velocity * dt;
        let corrected = self.recompute_shell(curves);

        self.shell_resolved = predicted && corrected;
    }

    /// Evaluate peak pressure and impulse at the current radius
    ///
    /// Returns false and keeps the previous values when the curves cannot be
    /// evaluated there.
    fn recompute_shell(&mut self, curves: &BlastCurves) -> bool {
        let scaled_distance = self.radius * self.inv_cube_root;
        if !scaled_distance.is_finite() {
            log::warn!(
                "Non-finite scaled distance for blast of {:.3e} kg TNT at radius {} m",
                self.tnt_mass,
                self.radius
            );
            return false;
        }

        let overpressure = curves.overpressure(scaled_distance) * self.ambient_pressure;
        let impulse =
            curves.impulse(scaled_distance) * self.ambient_pressure * self.impulse_factor;
        if !overpressure.is_finite() || !impulse.is_finite() {
            log::warn!(
                "Non-finite blast state at scaled distance {}: overpressure {}, impulse {}",
                scaled_distance,
                overpressure,
                impulse
            );
            return false;
        }

        self.peak_pressure = overpressure.min(self.max_overpressure) + self.ambient_pressure;
        self.impulse = impulse;
        true
    }

    /// False when the last step kept stale peak values, so the swept shell
    /// must not load anything
    pub fn shell_resolved(&self) -> bool {
        self.shell_resolved
    }

    /// Rankine-Hugoniot shock velocity for the current peak pressure
    pub fn wave_velocity(&self) -> f64 {
        let gamma = self.adiabatic_index;
        let mach_sq = 1.0
            + (gamma + 1.0) / (2.0 * gamma) * (self.peak_pressure / self.ambient_pressure - 1.0);
        mach_sq.max(1.0).sqrt() * self.sound_speed
    }

    /// Spent, too large, or decayed to an acoustic wave
    pub fn is_complete(&self, tunables: &BlastTunables) -> bool {
        self.yield_joules <= tunables.spent_yield
            || self.radius > tunables.max_radius
            || self.velocity < self.sound_speed * tunables.completion_mach
            || !self.radius.is_finite()
    }

    /// Add `delta` joules released at `location`
    ///
    /// The position moves to the yield-weighted average of both sources. A
    /// negative delta removes yield; once nothing is left the event sits at
    /// `location` with zero yield.
    pub fn update_yield(&mut self, delta: f64, location: DVec3) {
        let weighted = location * delta + self.position * self.yield_joules;
        let new_yield = self.yield_joules + delta;

        if new_yield > 0.0 {
            self.position = weighted / new_yield;
            self.set_yield(new_yield);
        } else {
            self.position = location;
            self.set_yield(0.0);
        }
    }

    fn set_yield(&mut self, yield_joules: f64) {
        self.yield_joules = yield_joules;
        self.tnt_mass = yield_joules * JOULE_TO_KG_TNT;
        self.inv_cube_root = self.tnt_mass.powf(-1.0 / 3.0);
    }

    /// Load at `distance` from the centre, interpolated across the shell
    /// swept during the last step
    pub fn shell_at(&self, distance: f64) -> Option<ShellLoad> {
        let radius_diff = self.radius - self.prev_radius;
        let pressure_diff = self.peak_pressure - self.prev_peak_pressure;
        let impulse_diff = self.impulse - self.prev_impulse;

        if !(radius_diff > 0.0) || !pressure_diff.is_finite() || !impulse_diff.is_finite() {
            log::warn!(
                "Cannot resolve blast shell: radius diff {}, pressure diff {}, impulse diff {}",
                radius_diff,
                pressure_diff,
                impulse_diff
            );
            return None;
        }

        let t = (distance - self.prev_radius) / radius_diff;
        Some(ShellLoad {
            overpressure: pressure_diff * t + self.prev_peak_pressure - self.ambient_pressure,
            impulse: impulse_diff * t + self.prev_impulse,
        })
    }

    pub(crate) fn translate(&mut self, offset: DVec3) {
        self.position += offset;
    }

    pub fn yield_joules(&self) -> f64 {
        self.yield_joules
    }

    /// TNT-equivalent mass (kg)
    pub fn tnt_mass(&self) -> f64 {
        self.tnt_mass
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn previous_radius(&self) -> f64 {
        self.prev_radius
    }

    pub fn peak_pressure(&self) -> f64 {
        self.peak_pressure
    }

    pub fn impulse(&self) -> f64 {
        self.impulse
    }

    /// Front velocity from the last step (m/s)
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn ambient_pressure(&self) -> f64 {
        self.ambient_pressure
    }

    pub fn sound_speed(&self) -> f64 {
        self.sound_speed
    }

    pub fn max_overpressure(&self) -> f64 {
        self.max_overpressure
    }

    pub fn impulse_factor(&self) -> f64 {
        self.impulse_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blastwave_simulation::KG_TNT_TO_JOULE;

    const DT: f64 = 0.02;

    fn one_kg_blast(curves: &BlastCurves) -> BlastEvent {
        let mut event = BlastEvent::new();
        let request = BlastRequest::new(KG_TNT_TO_JOULE, DVec3::ZERO);
        assert!(event.initiate(&request, &AtmosphereSample::sea_level(), curves));
        event
    }

    #[test]
    fn test_initiate_sets_peak_state() {
        let curves = BlastCurves::kinney_graham();
        let event = one_kg_blast(&curves);
        let ambient = 101.325;

        assert!((event.tnt_mass() - 1.0).abs() < 1e-3);
        assert_eq!(event.radius(), 0.0);
        assert_eq!(event.velocity(), 0.0);
        assert!(
            (event.peak_pressure() - (curves.peak_overpressure() * ambient + ambient)).abs() < 1e-9
        );
        assert!((event.impulse() - curves.peak_impulse() * ambient).abs() < 1e-6);
    }

    #[test]
    fn test_initiate_respects_overpressure_cap() {
        let curves = BlastCurves::kinney_graham();
        let mut event = BlastEvent::new();
        let request = BlastRequest::new(1e6, DVec3::ZERO).with_max_overpressure(200.0);
        assert!(event.initiate(&request, &AtmosphereSample::sea_level(), &curves));
        assert!((event.peak_pressure() - 301.325).abs() < 1e-9);
    }

    #[test]
    fn test_initiate_rejects_vacuum() {
        let curves = BlastCurves::kinney_graham();
        let mut event = BlastEvent::new();
        let request = BlastRequest::new(1e6, DVec3::ZERO);
        assert!(!event.initiate(&request, &AtmosphereSample::VACUUM, &curves));
    }

    #[test]
    fn test_initiate_rejects_invalid_yield() {
        let curves = BlastCurves::kinney_graham();
        let mut event = BlastEvent::new();
        let sea_level = AtmosphereSample::sea_level();
        assert!(!event.initiate(&BlastRequest::new(-5.0, DVec3::ZERO), &sea_level, &curves));
        assert!(!event.initiate(&BlastRequest::new(f64::NAN, DVec3::ZERO), &sea_level, &curves));
    }

    #[test]
    fn test_zero_yield_front_is_unresolved() {
        let curves = BlastCurves::kinney_graham();
        let mut event = BlastEvent::new();
        let request = BlastRequest::new(0.0, DVec3::ZERO);
        assert!(event.initiate(&request, &AtmosphereSample::sea_level(), &curves));

        event.advance(DT, &curves);
        assert!(!event.shell_resolved());

        let mut live = one_kg_blast(&curves);
        live.advance(DT, &curves);
        assert!(live.shell_resolved());
    }

    #[test]
    fn test_wave_velocity_at_ambient_is_sound_speed() {
        let curves = BlastCurves::kinney_graham();
        let mut event = one_kg_blast(&curves);
        event.peak_pressure = event.ambient_pressure;
        assert!((event.wave_velocity() - 340.29).abs() < 1e-9);

        // below ambient still travels at the sound speed
        event.peak_pressure = event.ambient_pressure * 0.5;
        assert!((event.wave_velocity() - 340.29).abs() < 1e-9);
    }

    #[test]
    fn test_first_step_is_supersonic() {
        let curves = BlastCurves::kinney_graham();
        let mut event = one_kg_blast(&curves);
        event.advance(DT, &curves);

        assert!(event.radius() > 50.0 && event.radius() < 150.0);
        assert!(event.velocity() > 340.29 * 5.0);
        assert_eq!(event.previous_radius(), 0.0);
        assert!(event.peak_pressure() < event.prev_peak_pressure);
    }

    #[test]
    fn test_radius_never_shrinks() {
        let curves = BlastCurves::kinney_graham();
        let tunables = BlastTunables::default();
        let mut event = one_kg_blast(&curves);
        let mut last = 0.0;
        for _ in 0..200 {
            event.advance(DT, &curves);
            assert!(event.radius() >= last);
            assert!(event.peak_pressure() >= event.ambient_pressure());
            last = event.radius();
            if event.is_complete(&tunables) {
                return;
            }
        }
        panic!("1 kg blast should decay to a sound wave within 200 steps");
    }

    #[test]
    fn test_spent_blast_is_complete() {
        let curves = BlastCurves::kinney_graham();
        let tunables = BlastTunables::default();
        let mut event = one_kg_blast(&curves);
        event.advance(DT, &curves);
        assert!(!event.is_complete(&tunables));

        event.update_yield(-event.yield_joules(), event.position());
        assert!(event.is_complete(&tunables));
    }

    #[test]
    fn test_update_yield_weights_position() {
        let curves = BlastCurves::kinney_graham();
        let mut event = one_kg_blast(&curves);
        event.update_yield(3.0 * KG_TNT_TO_JOULE, DVec3::new(4.0, 0.0, 0.0));

        assert!((event.yield_joules() - 4.0 * KG_TNT_TO_JOULE).abs() < 1e-6);
        assert!((event.position().x - 3.0).abs() < 1e-12);
        assert!((event.tnt_mass() - 4.0 * KG_TNT_TO_JOULE * JOULE_TO_KG_TNT).abs() < 1e-9);
    }

    #[test]
    fn test_update_yield_to_zero_keeps_finite_position() {
        let curves = BlastCurves::kinney_graham();
        let mut event = one_kg_blast(&curves);
        let location = DVec3::new(1.0, 2.0, 3.0);
        event.update_yield(-2.0 * KG_TNT_TO_JOULE, location);

        assert_eq!(event.yield_joules(), 0.0);
        assert_eq!(event.position(), location);
    }

    #[test]
    fn test_shell_interpolates_between_fronts() {
        let curves = BlastCurves::kinney_graham();
        let mut event = one_kg_blast(&curves);
        event.advance(DT, &curves);
        event.advance(DT, &curves);

        let inner = event.shell_at(event.previous_radius()).unwrap();
        let outer = event.shell_at(event.radius()).unwrap();
        let mid = event
            .shell_at(0.5 * (event.previous_radius() + event.radius()))
            .unwrap();

        assert!((inner.overpressure - (event.prev_peak_pressure - 101.325)).abs() < 1e-9);
        assert!((outer.overpressure - (event.peak_pressure() - 101.325)).abs() < 1e-9);
        assert!((outer.impulse - event.impulse()).abs() < 1e-9);
        assert!(mid.overpressure <= inner.overpressure && mid.overpressure >= outer.overpressure);
    }

    #[test]
    fn test_shell_before_first_step_is_none() {
        let curves = BlastCurves::kinney_graham();
        let event = one_kg_blast(&curves);
        assert!(event.shell_at(1.0).is_none());
    }

    #[test]
    fn test_impulse_factor_scales_impulse() {
        let curves = BlastCurves::kinney_graham();
        let sea_level = AtmosphereSample::sea_level();
        let mut plain = BlastEvent::new();
        let mut boosted = BlastEvent::new();
        plain.initiate(&BlastRequest::new(1e7, DVec3::ZERO), &sea_level, &curves);
        boosted.initiate(
            &BlastRequest::new(1e7, DVec3::ZERO).with_impulse_factor(2.0),
            &sea_level,
            &curves,
        );
        plain.advance(DT, &curves);
        boosted.advance(DT, &curves);

        assert_eq!(plain.radius(), boosted.radius());
        assert!((boosted.impulse() - 2.0 * plain.impulse()).abs() < 1e-9 * plain.impulse());
    }
}
