//! Free reactant bubbles released by destroyed or unpacked sources

use std::f64::consts::PI;

use blastwave_simulation::{ReactionRegistry, ResourceAmount, ResourceId, Resources};
use glam::DVec3;

use crate::config::ReactantTunables;

/// A short-lived spherical cloud of one resource
#[derive(Clone, Debug, PartialEq)]
pub struct FreeReactant {
    pub resource: ResourceId,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Mass still available to react (kg)
    pub mass: f64,
    /// Fixed at creation from the initial volume
    radius: f64,
    age: f64,
}

impl FreeReactant {
    /// Bubble holding `volume` cubic metres of `mass` kilograms
    pub fn new(resource: ResourceId, mass: f64, volume: f64, position: DVec3, velocity: DVec3) -> Self {
        Self {
            resource,
            position,
            velocity,
            mass,
            radius: (0.75 * volume / PI).cbrt(),
            age: 0.0,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Seconds since release
    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn is_expired(&self, lifetime: f64) -> bool {
        self.age >= lifetime || self.mass <= 0.0
    }

    fn advance(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        self.age += dt;
    }
}

/// Owns every live reactant bubble
pub struct FreeReactantRegistry {
    reactants: Vec<FreeReactant>,
    tunables: ReactantTunables,
}

impl FreeReactantRegistry {
    pub fn new(tunables: ReactantTunables) -> Self {
        Self {
            reactants: Vec::new(),
            tunables,
        }
    }

    /// Release one bubble per reactive resource held by a source
    ///
    /// Amounts are litres. Resources that cannot react, and empty amounts,
    /// are ignored. Returns the number of bubbles created.
    pub fn spawn_from_source(
        &mut self,
        amounts: &[ResourceAmount],
        position: DVec3,
        velocity: DVec3,
        resources: &Resources,
        reactions: &ReactionRegistry,
    ) -> usize {
        let mut spawned = 0;
        for amount in amounts {
            if amount.amount <= 0.0 || !reactions.is_reactant(amount.resource) {
                continue;
            }

            let mass = amount.amount * resources.density(amount.resource);
            let volume = amount.amount * self.tunables.litre_volume;
            let reactant = FreeReactant::new(amount.resource, mass, volume, position, velocity);

            log::debug!(
                "Released reactant {:?}: {:.3} kg, radius {:.3} m",
                amount.resource,
                reactant.mass,
                reactant.radius
            );

            self.reactants.push(reactant);
            spawned += 1;
        }
        spawned
    }

    pub fn push(&mut self, reactant: FreeReactant) {
        self.reactants.push(reactant);
    }

    /// Move and age every bubble, dropping expired ones
    ///
    /// Returns the number of bubbles removed.
    pub fn tick(&mut self, dt: f64) -> usize {
        let lifetime = self.tunables.lifetime;
        let before = self.reactants.len();
        self.reactants.retain_mut(|reactant| {
            reactant.advance(dt);
            !reactant.is_expired(lifetime)
        });
        before - self.reactants.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FreeReactant> {
        self.reactants.iter()
    }

    pub fn as_slice(&self) -> &[FreeReactant] {
        &self.reactants
    }

    pub fn as_mut_slice(&mut self) -> &mut [FreeReactant] {
        &mut self.reactants
    }

    pub fn len(&self) -> usize {
        self.reactants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactants.is_empty()
    }

    pub fn clear(&mut self) {
        self.reactants.clear();
    }

    pub fn tunables(&self) -> &ReactantTunables {
        &self.tunables
    }
}

impl Default for FreeReactantRegistry {
    fn default() -> Self {
        Self::new(ReactantTunables::default())
    }
}
