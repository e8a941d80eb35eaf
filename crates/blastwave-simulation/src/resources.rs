//! Resource definitions and registry

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a registered resource type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub u16);

/// Definition of a resource carried by parts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceDef {
    pub id: ResourceId,
    pub name: String,
    /// Mass per unit amount (kg/L)
    pub density: f64,
}

/// An amount of a resource held by a part or tank (litres)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub resource: ResourceId,
    pub amount: f64,
}

impl ResourceAmount {
    pub fn new(resource: ResourceId, amount: f64) -> Self {
        Self { resource, amount }
    }
}

/// Registry of all resource types, indexed by id and by name
pub struct Resources {
    resources: Vec<ResourceDef>,
    by_name: HashMap<String, ResourceId>,
}

impl Resources {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registry preloaded with the stock rocket propellants
    pub fn with_stock_propellants() -> Self {
        let mut resources = Self::new();
        resources.register("LiquidFuel", 5.0);
        resources.register("Oxidizer", 5.0);
        resources.register("MonoPropellant", 4.0);
        resources.register("SolidFuel", 7.5);
        resources.register("XenonGas", 0.1);
        resources
    }

    /// Register a resource, returning its id
    ///
    /// Registering an existing name updates its density and keeps the id.
    pub fn register(&mut self, name: &str, density: f64) -> ResourceId {
        if let Some(&id) = self.by_name.get(name) {
            self.resources[id.0 as usize].density = density;
            return id;
        }

        let id = ResourceId(self.resources.len() as u16);
        self.resources.push(ResourceDef {
            id,
            name: name.to_string(),
            density,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: ResourceId) -> Option<&ResourceDef> {
        self.resources.get(id.0 as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<ResourceId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&ResourceDef> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    /// Density of a resource, zero for unknown ids
    pub fn density(&self, id: ResourceId) -> f64 {
        self.get(id).map(|r| r.density).unwrap_or(0.0)
    }

    /// Total mass of a list of resource amounts (kg)
    pub fn total_mass(&self, amounts: &[ResourceAmount]) -> f64 {
        amounts
            .iter()
            .map(|a| a.amount.max(0.0) * self.density(a.resource))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDef> {
        self.resources.iter()
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}
