//! Reaction matching between overlapping reactant bubbles

use blastwave_simulation::{
    KG_TNT_TO_JOULE, ReactionDefinition, ReactionId, ReactionRegistry, ResourceId,
};
use glam::DVec3;

use super::blast::BlastRequest;
use super::reactants::FreeReactant;
use crate::world::{Atmosphere, BlastStats};

/// Mass of each reactant consumed by one reaction
///
/// `ratio` is the stoichiometric ratio of the first reactant to the second.
/// Whichever side runs out first is consumed completely.
pub fn consume_stoichiometric(first_mass: f64, second_mass: f64, ratio: f64) -> (f64, f64) {
    if second_mass * ratio / first_mass > 1.0 {
        (first_mass, first_mass / ratio)
    } else {
        (second_mass * ratio, second_mass)
    }
}

/// Pairs overlapping bubbles that share a reaction and turns them into blasts
pub struct ReactionMatcher {
    registry: ReactionRegistry,
    overlap_fraction: f64,
}

impl ReactionMatcher {
    pub fn new(registry: ReactionRegistry, overlap_fraction: f64) -> Self {
        Self {
            registry,
            overlap_fraction,
        }
    }

    pub fn registry(&self) -> &ReactionRegistry {
        &self.registry
    }

    /// First reaction shared by both resources that can run here
    ///
    /// Candidates are tried in ascending [`ReactionId`] order, so the
    /// reaction loaded first wins.
    pub fn select_reaction(&self, a: ResourceId, b: ResourceId, oxygen: bool) -> Option<ReactionId> {
        self.registry.shared_reactions(a, b).find(|id| {
            self.registry
                .get(*id)
                .is_some_and(|reaction| oxygen || !reaction.requires_oxygen_atmosphere)
        })
    }

    /// React every overlapping pair once, consuming their mass
    ///
    /// Returns a blast request for each reaction that released energy.
    pub fn run<A: Atmosphere + ?Sized>(
        &self,
        reactants: &mut [FreeReactant],
        atmosphere: &A,
        stats: &mut dyn BlastStats,
    ) -> Vec<BlastRequest> {
        let mut requests = Vec::new();

        for i in 0..reactants.len() {
            let (head, tail) = reactants.split_at_mut(i + 1);
            let first = &mut head[i];

            for second in tail.iter_mut() {
                if first.mass <= 0.0 {
                    break;
                }
                if first.resource == second.resource || second.mass <= 0.0 {
                    continue;
                }

                let reach = (first.radius() + second.radius()) * self.overlap_fraction;
                if first.position.distance(second.position) > reach {
                    continue;
                }

                let midpoint = 0.5 * (first.position + second.position);
                let oxygen = atmosphere.sample(midpoint).oxygen;
                let Some(id) = self.select_reaction(first.resource, second.resource, oxygen) else {
                    continue;
                };
                let Some(reaction) = self.registry.get(id) else {
                    continue;
                };

                stats.record_reaction();
                if let Some(request) = react(reaction, first, second) {
                    log::info!(
                        "Reaction '{}' released {:.3e} J at {:?}",
                        reaction.name,
                        request.yield_joules,
                        request.position
                    );
                    requests.push(request);
                }
            }
        }

        requests
    }
}

/// Consume the limiting amounts of both bubbles and size the resulting blast
fn react(
    reaction: &ReactionDefinition,
    first: &mut FreeReactant,
    second: &mut FreeReactant,
) -> Option<BlastRequest> {
    let (Some(first_ratio), Some(second_ratio)) =
        (reaction.ratio(first.resource), reaction.ratio(second.resource))
    else {
        return None;
    };

    let (first_used, second_used) =
        consume_stoichiometric(first.mass, second.mass, first_ratio / second_ratio);
    first.mass = (first.mass - first_used).max(0.0);
    second.mass = (second.mass - second_used).max(0.0);

    let consumed = first_used + second_used;
    if !(consumed > 0.0) {
        return None;
    }

    let position = (first.position * first_used + second.position * second_used) / consumed;
    let velocity: DVec3 = (first.velocity * first_used + second.velocity * second_used) / consumed;

    let tnt_fraction = reaction.yield_curve.evaluate(velocity.length());
    let yield_joules = tnt_fraction * KG_TNT_TO_JOULE * consumed;
    if !(yield_joules > 0.0) {
        log::debug!(
            "Reaction '{}' consumed {:.3} kg without releasing energy",
            reaction.name,
            consumed
        );
        return None;
    }

    Some(
        BlastRequest::new(yield_joules, position)
            .with_max_overpressure(reaction.max_overpressure_kpa)
            .with_impulse_factor(reaction.impulse_factor),
    )
}
