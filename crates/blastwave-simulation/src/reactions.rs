//! Explosive reaction definitions
//!
//! A reaction lists the resources that ignite together with their
//! stoichiometric ratios and a yield curve mapping impact speed (m/s) to the
//! TNT-equivalent mass fraction released per kilogram consumed.

use crate::curves::FloatCurve;
use crate::resources::{ResourceId, Resources};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Index of a reaction in its registry, in load order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionId(pub u32);

/// A loaded explosive reaction
#[derive(Clone, Debug)]
pub struct ReactionDefinition {
    pub name: String,
    /// Stoichiometric ratio per participating resource
    pub ratios: Vec<(ResourceId, f64)>,
    /// TNT-equivalent mass fraction as a function of impact speed
    pub yield_curve: FloatCurve,
    pub requires_oxygen_atmosphere: bool,
    /// Cap on the blast's peak overpressure (kPa)
    pub max_overpressure_kpa: f64,
    pub impulse_factor: f64,
}

impl ReactionDefinition {
    pub fn ratio(&self, resource: ResourceId) -> Option<f64> {
        self.ratios
            .iter()
            .find(|(id, _)| *id == resource)
            .map(|(_, ratio)| *ratio)
    }

    pub fn involves(&self, resource: ResourceId) -> bool {
        self.ratio(resource).is_some()
    }
}

/// Problems found while building reactions from configuration
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ReactionConfigError {
    #[error("unknown resource '{name}'")]
    UnknownResource { name: String },

    #[error("reaction '{reaction}': resource '{resource}' has no positive ratio")]
    MissingRatio { reaction: String, resource: String },

    #[error("reaction '{reaction}': resource '{resource}' is not declared reactive")]
    NotReactive { reaction: String, resource: String },

    #[error("reaction '{reaction}': resource '{resource}' is listed more than once")]
    DuplicateReactant { reaction: String, resource: String },

    #[error("reaction '{reaction}' has {count} usable reactants, at least two are required")]
    TooFewReactants { reaction: String, count: usize },

    #[error("reaction '{reaction}' has no yield curve")]
    MissingYieldCurve { reaction: String },
}

/// Serialized reaction set
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReactionConfig {
    /// Resources that spawn free reactants when released
    #[serde(default)]
    pub reactive_resources: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<ReactionEntry>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReactionEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: Vec<ReactantEntry>,
    #[serde(default)]
    pub yield_curve: Vec<YieldKey>,
    #[serde(default)]
    pub requires_oxygen_atm: bool,
    #[serde(default)]
    pub max_overpressure_kpa: Option<f64>,
    #[serde(default)]
    pub impulse_factor: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReactantEntry {
    pub resource: String,
    #[serde(default)]
    pub ratio: Option<f64>,
}

/// Yield curve key; tangents are derived from neighbours when omitted
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct YieldKey {
    pub speed: f64,
    pub fraction: f64,
    #[serde(default)]
    pub in_tangent: Option<f64>,
    #[serde(default)]
    pub out_tangent: Option<f64>,
}

/// Summary of a configuration load
#[derive(Clone, Debug, Default)]
pub struct ReactionLoadReport {
    pub reactants: usize,
    pub reactions: usize,
    pub skipped: Vec<ReactionConfigError>,
}

/// Registry of explosive reactions with per-resource candidate sets
///
/// Candidate sets are ordered by [`ReactionId`], so the reaction chosen for a
/// pair of resources sharing several reactions is always the one loaded first.
pub struct ReactionRegistry {
    reactions: Vec<ReactionDefinition>,
    candidates: HashMap<ResourceId, BTreeSet<ReactionId>>,
}

impl ReactionRegistry {
    pub fn new() -> Self {
        Self {
            reactions: Vec::new(),
            candidates: HashMap::new(),
        }
    }

    /// Build a registry from configuration, skipping malformed entries
    ///
    /// Reactive resources are registered first so that reactions can be
    /// attached to them regardless of their order in the configuration.
    pub fn from_config(config: &ReactionConfig, resources: &Resources) -> (Self, ReactionLoadReport) {
        let mut registry = Self::new();
        let mut report = ReactionLoadReport::default();

        for name in &config.reactive_resources {
            match resources.id_of(name) {
                Some(id) => {
                    if registry.add_reactant(id) {
                        log::debug!("Adding {} as possible reactant", name);
                    }
                }
                None => {
                    let err = ReactionConfigError::UnknownResource { name: name.clone() };
                    log::warn!("Skipping reactive resource: {}", err);
                    report.skipped.push(err);
                }
            }
        }

        for entry in &config.reactions {
            match registry.build_definition(entry, resources, &mut report.skipped) {
                Ok(definition) => {
                    registry.add_reaction(definition);
                }
                Err(err) => {
                    log::warn!("Skipping explosive reaction: {}", err);
                    report.skipped.push(err);
                }
            }
        }

        report.reactants = registry.candidates.len();
        report.reactions = registry.reactions.len();
        log::info!(
            "Loaded {} explosive reactions over {} reactive resources ({} entries skipped)",
            report.reactions,
            report.reactants,
            report.skipped.len()
        );

        (registry, report)
    }

    /// Resolve one configured reaction
    ///
    /// Individual malformed reactants are pushed to `skipped`; the reaction
    /// itself fails only when fewer than two usable reactants remain.
    fn build_definition(
        &self,
        entry: &ReactionEntry,
        resources: &Resources,
        skipped: &mut Vec<ReactionConfigError>,
    ) -> Result<ReactionDefinition, ReactionConfigError> {
        let reaction = entry.name.clone();
        let mut ratios: Vec<(ResourceId, f64)> = Vec::with_capacity(entry.resources.len());

        for reactant in &entry.resources {
            let Some(id) = resources.id_of(&reactant.resource) else {
                let err = ReactionConfigError::UnknownResource {
                    name: reactant.resource.clone(),
                };
                log::warn!("Reaction '{}': {}", reaction, err);
                skipped.push(err);
                continue;
            };

            let err = match reactant.ratio {
                Some(ratio) if ratio > 0.0 && ratio.is_finite() => {
                    if !self.is_reactant(id) {
                        Some(ReactionConfigError::NotReactive {
                            reaction: reaction.clone(),
                            resource: reactant.resource.clone(),
                        })
                    } else if ratios.iter().any(|(existing, _)| *existing == id) {
                        Some(ReactionConfigError::DuplicateReactant {
                            reaction: reaction.clone(),
                            resource: reactant.resource.clone(),
                        })
                    } else {
                        ratios.push((id, ratio));
                        None
                    }
                }
                _ => Some(ReactionConfigError::MissingRatio {
                    reaction: reaction.clone(),
                    resource: reactant.resource.clone(),
                }),
            };

            if let Some(err) = err {
                log::warn!("{}", err);
                skipped.push(err);
            }
        }

        if ratios.len() < 2 {
            return Err(ReactionConfigError::TooFewReactants {
                reaction,
                count: ratios.len(),
            });
        }

        if entry.yield_curve.is_empty() {
            return Err(ReactionConfigError::MissingYieldCurve { reaction });
        }

        Ok(ReactionDefinition {
            name: reaction,
            ratios,
            yield_curve: build_yield_curve(&entry.yield_curve),
            requires_oxygen_atmosphere: entry.requires_oxygen_atm,
            max_overpressure_kpa: entry.max_overpressure_kpa.unwrap_or(f64::INFINITY),
            impulse_factor: entry.impulse_factor.unwrap_or(1.0),
        })
    }

    /// Mark a resource as able to react; returns false if it already was
    pub fn add_reactant(&mut self, resource: ResourceId) -> bool {
        if self.candidates.contains_key(&resource) {
            return false;
        }
        self.candidates.insert(resource, BTreeSet::new());
        true
    }

    /// Add a reaction, registering any of its resources not yet reactive
    pub fn add_reaction(&mut self, definition: ReactionDefinition) -> ReactionId {
        let id = ReactionId(self.reactions.len() as u32);
        for (resource, _) in &definition.ratios {
            self.candidates.entry(*resource).or_default().insert(id);
        }
        self.reactions.push(definition);
        id
    }

    pub fn is_reactant(&self, resource: ResourceId) -> bool {
        self.candidates.contains_key(&resource)
    }

    pub fn candidates(&self, resource: ResourceId) -> Option<&BTreeSet<ReactionId>> {
        self.candidates.get(&resource)
    }

    pub fn get(&self, id: ReactionId) -> Option<&ReactionDefinition> {
        self.reactions.get(id.0 as usize)
    }

    /// Reactions shared by two resources, in ascending id order
    ///
    /// Scans the smaller candidate set and looks each id up in the larger one.
    pub fn shared_reactions(
        &self,
        a: ResourceId,
        b: ResourceId,
    ) -> impl Iterator<Item = ReactionId> + '_ {
        let (smaller, larger) = match (self.candidates.get(&a), self.candidates.get(&b)) {
            (Some(sa), Some(sb)) if sa.len() > sb.len() => (Some(sb), Some(sa)),
            (sa, sb) => (sa, sb),
        };
        smaller
            .into_iter()
            .flatten()
            .filter(move |id| larger.is_some_and(|set| set.contains(*id)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
}

impl Default for ReactionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn build_yield_curve(keys: &[YieldKey]) -> FloatCurve {
    let points: Vec<(f64, f64)> = keys.iter().map(|k| (k.speed, k.fraction)).collect();
    let smooth = FloatCurve::from_points(&points);

    let mut curve = FloatCurve::new();
    for key in smooth.keys() {
        let explicit = keys.iter().find(|k| k.speed == key.time);
        let in_tangent = explicit.and_then(|k| k.in_tangent).unwrap_or(key.in_tangent);
        let out_tangent = explicit.and_then(|k| k.out_tangent).unwrap_or(key.out_tangent);
        curve.add(key.time, key.value, in_tangent, out_tangent);
    }
    curve
}
