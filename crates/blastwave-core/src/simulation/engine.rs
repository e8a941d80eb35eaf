//! Blast-wave engine - pooling, propagation, effects and coalescence

use blastwave_simulation::BlastCurves;

use super::blast::{BlastEvent, BlastRequest};
use super::damage::{DamageOutcome, apply_building_damage, apply_part_damage, directional_impulse};
use crate::config::{BlastTunables, BlastwaveConfig};
use crate::world::{
    Atmosphere, BlastStats, BlastWorld, DamageRng, DamageableBuilding, DamageablePart, FrameShift,
};

/// Owns every blast event and advances the active ones each fixed step
///
/// Active events are kept in a dense list. Each event carries a row of
/// separations to its peers indexed like that list, so retiring an event
/// removes the same index from the list and from every row.
pub struct BlastwaveEngine {
    curves: BlastCurves,
    tunables: BlastTunables,
    fixed_step: f64,
    active: Vec<BlastEvent>,
    inactive: Vec<BlastEvent>,
}

impl BlastwaveEngine {
    pub fn new(config: &BlastwaveConfig) -> Self {
        let tunables = config.blast.clone();
        let inactive = (0..tunables.baseline_pool_size)
            .map(|_| BlastEvent::new())
            .collect();

        Self {
            curves: BlastCurves::kinney_graham(),
            tunables,
            fixed_step: config.fixed_step,
            active: Vec::new(),
            inactive,
        }
    }

    /// Start a blast; returns false if the yield is already spent or the
    /// atmosphere cannot carry it
    pub fn create_blast<A: Atmosphere + ?Sized>(
        &mut self,
        request: BlastRequest,
        atmosphere: &A,
        stats: &mut dyn BlastStats,
    ) -> bool {
        if request.yield_joules <= self.tunables.spent_yield {
            log::debug!(
                "Blast of {:.3e} J at {:?} not started (spent yield)",
                request.yield_joules,
                request.position
            );
            return false;
        }

        let mut event = self.inactive.pop().unwrap_or_else(BlastEvent::new);
        let ambient = atmosphere.sample(request.position);

        if !event.initiate(&request, &ambient, &self.curves) {
            log::debug!(
                "Blast of {:.3e} J at {:?} not started (ambient {:.3} kPa, {:.1} m/s)",
                request.yield_joules,
                request.position,
                ambient.pressure_kpa,
                ambient.sound_speed
            );
            self.recycle(event);
            return false;
        }

        for other in &mut self.active {
            let distance = other.position().distance(event.position());
            other.peer_distances.push(distance);
            event.peer_distances.push(distance);
        }
        event.peer_distances.push(0.0);

        log::info!(
            "Blast created: {:.3} kg TNT at {:?} ({} active)",
            event.tnt_mass(),
            event.position(),
            self.active.len() + 1
        );

        self.active.push(event);
        stats.record_blast_created();
        true
    }

    /// Advance every active blast by one fixed step
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
        if self.active.is_empty() {
            return;
        }

        let displacement = frame.displacement(self.fixed_step);
        for event in &mut self.active {
            event.translate(displacement);
        }

        for event in &mut self.active {
            event.advance(self.fixed_step, &self.curves);
            if event.shell_resolved() {
                apply_effects(event, &self.tunables, world, rng, stats);
            }
        }

        self.coalesce(stats);
        self.retire_completed(stats);
    }

    /// Merge blasts whose fronts have grown together
    ///
    /// Each ordered pair is checked, but a spent event is skipped on either
    /// side so a pair merges at most once.
    fn coalesce(&mut self, stats: &mut dyn BlastStats) {
        let spent = self.tunables.spent_yield;
        let count = self.active.len();

        for i in 0..count {
            for j in 0..count {
                if i == j {
                    continue;
                }
                if self.active[i].yield_joules() <= spent || self.active[j].yield_joules() <= spent {
                    continue;
                }

                let merge_radius =
                    self.active[i].peer_distances[j] * self.tunables.coalescence_distance_factor;
                let radius_i = self.active[i].radius();
                let radius_j = self.active[j].radius();
                if radius_i <= merge_radius || radius_j <= merge_radius {
                    continue;
                }

                let relative_diff = (2.0 * (radius_i - radius_j) / (radius_i + radius_j)).abs();
                if relative_diff > self.tunables.coalescence_radius_tolerance {
                    continue;
                }

                let transferred = self.active[j].yield_joules();
                let location = self.active[j].position();
                self.active[i].update_yield(transferred, location);
                self.active[j].update_yield(-transferred, location);

                log::info!(
                    "Merged blasts: {:.3e} J absorbed, now {:.3} kg TNT at {:?}",
                    transferred,
                    self.active[i].tnt_mass(),
                    self.active[i].position()
                );
                stats.record_coalescence();
            }
        }
    }

    fn retire_completed(&mut self, stats: &mut dyn BlastStats) {
        let mut index = 0;
        while index < self.active.len() {
            if !self.active[index].is_complete(&self.tunables) {
                index += 1;
                continue;
            }

            let event = self.active.swap_remove(index);
            for other in &mut self.active {
                other.peer_distances.swap_remove(index);
            }

            log::debug!(
                "Blast retired at radius {:.1} m ({:.3} kg TNT)",
                event.radius(),
                event.tnt_mass()
            );
            stats.record_blast_retired();
            self.recycle(event);
        }
    }

    fn recycle(&mut self, mut event: BlastEvent) {
        if self.inactive.len() < self.tunables.baseline_pool_size {
            event.peer_distances.clear();
            self.inactive.push(event);
        }
    }

    /// Retire every active blast into the pool
    pub fn clear(&mut self) {
        let retired: Vec<BlastEvent> = self.active.drain(..).collect();
        for event in retired {
            self.recycle(event);
        }
    }

    pub fn active_blasts(&self) -> &[BlastEvent] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Preallocated events waiting for reuse
    pub fn pool_count(&self) -> usize {
        self.inactive.len()
    }

    pub fn curves(&self) -> &BlastCurves {
        &self.curves
    }

    pub fn tunables(&self) -> &BlastTunables {
        &self.tunables
    }

    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }
}

impl Default for BlastwaveEngine {
    fn default() -> Self {
        Self::new(&BlastwaveConfig::default())
    }
}

/// Load every vessel part and building swept by the front this step
fn apply_effects<W, R>(
    event: &BlastEvent,
    tunables: &BlastTunables,
    world: &mut W,
    rng: &mut R,
    stats: &mut dyn BlastStats,
) where
    W: BlastWorld + ?Sized,
    R: DamageRng + ?Sized,
{
    let margin = tunables.vessel_margin_factor * event.velocity();
    let outer = event.radius() + margin;
    let inner = event.previous_radius() - margin;

    for vessel in 0..world.vessel_count() {
        let distance = world.vessel_position(vessel).distance(event.position());
        if distance > outer || distance < inner {
            continue;
        }
        apply_to_parts(event, world.vessel_parts_mut(vessel), rng, stats);
    }

    for building in world.buildings_mut() {
        let distance = building.position().distance(event.position());
        if distance <= event.previous_radius() || distance >= event.radius() {
            continue;
        }
        let Some(load) = event.shell_at(distance) else {
            return;
        };
        if apply_building_damage(building, load.impulse, load.overpressure) {
            stats.record_building_damaged();
        }
    }
}

fn apply_to_parts<P, R>(event: &BlastEvent, parts: &mut [P], rng: &mut R, stats: &mut dyn BlastStats)
where
    P: DamageablePart,
    R: DamageRng + ?Sized,
{
    for part in parts {
        if part.is_destroyed() {
            continue;
        }

        let offset = part.position() - event.position();
        let distance = offset.length();
        if !distance.is_finite()
            || distance <= 0.0
            || distance < event.previous_radius()
            || distance > event.radius()
        {
            continue;
        }

        let Some(load) = event.shell_at(distance) else {
            return;
        };
        let direction = offset / distance;
        let impulse = directional_impulse(direction, part.projected_area(direction), load.impulse);
        if !impulse.is_finite() {
            log::warn!(
                "Non-finite impulse on part at {:?}: overpressure {}, impulse {}",
                part.position(),
                load.overpressure,
                load.impulse
            );
            continue;
        }

        match apply_part_damage(part, load.impulse, load.overpressure, rng) {
            DamageOutcome::Destroyed => stats.record_part_destroyed(),
            _ => part.apply_impulse(impulse),
        }
    }
}
