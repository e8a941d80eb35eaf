//! Scenario definitions and RON file loading

use std::path::Path;

use anyhow::{Context, Result, bail};
use blastwave_core::{
    FrameShift, JointStrength, SandboxBuilding, SandboxPart, SandboxVessel, SandboxWorld,
    UniformAtmosphere,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Something that happens at a given tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioAction {
    /// Detonate a charge of TNT
    Detonate { tnt_kg: f64, position: DVec3 },

    /// Burn the contents of a destroyed tank in place
    Combust {
        resources: Vec<(String, f64)>,
        position: DVec3,
    },

    /// Spill the contents of a ruptured tank as free reactants
    Release {
        resources: Vec<(String, f64)>,
        position: DVec3,
        #[serde(default)]
        velocity: DVec3,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub tick: usize,
    pub action: ScenarioAction,
}

/// Top-level scenario definition loaded from RON files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Vessels, buildings and atmosphere the scenario runs in
    #[serde(default)]
    pub world: SandboxWorld,

    pub actions: Vec<ScheduledAction>,

    /// Floating-origin shift applied every tick; action positions are given
    /// in the frame of the first tick
    #[serde(default)]
    pub frame_shift: FrameShift,

    /// Overrides the configured tick count
    #[serde(default)]
    pub ticks: Option<usize>,
}

impl ScenarioDefinition {
    /// Load scenario from RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

        let scenario = ron::from_str(&content)
            .with_context(|| format!("Failed to parse RON scenario: {}", path.display()))?;

        Ok(scenario)
    }

    /// Save scenario to RON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let ron = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize scenario to RON")?;

        std::fs::write(path.as_ref(), ron).with_context(|| {
            format!("Failed to write scenario file: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    /// Built-in scenario by name, or a RON file path
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        if let Some(scenario) = builtin(name_or_path) {
            return Ok(scenario);
        }
        let path = Path::new(name_or_path);
        if path.exists() {
            return Self::from_file(path);
        }
        bail!(
            "Unknown scenario '{}' (built-in: {})",
            name_or_path,
            BUILTIN_SCENARIOS.join(", ")
        )
    }
}

pub const BUILTIN_SCENARIOS: &[&str] = &["launchpad", "cluster", "fuel_spill", "vacuum"];

/// Built-in scenarios
pub fn builtin(name: &str) -> Option<ScenarioDefinition> {
    match name {
        "launchpad" => Some(launchpad()),
        "cluster" => Some(cluster()),
        "fuel_spill" => Some(fuel_spill()),
        "vacuum" => Some(vacuum()),
        _ => None,
    }
}

fn stack(name: &str, base: DVec3, parts: usize) -> SandboxVessel {
    let mut vessel = SandboxVessel::new(name, base);
    for i in 0..parts {
        let position = base + DVec3::new(0.0, 0.0, 2.0 * i as f64);
        let part = SandboxPart::new(
            format!("{} part {}", name, i),
            position,
            DVec3::new(2.5, 2.5, 1.5),
            12.0,
        );
        vessel.parts.push(if i == 0 {
            part
        } else {
            part.with_joint(JointStrength::new(200.0, 200.0))
        });
    }
    vessel
}

/// A rocket on the pad blows up next to a second vessel and the pad buildings
fn launchpad() -> ScenarioDefinition {
    let mut world = SandboxWorld::new(UniformAtmosphere::sea_level());
    world.add_vessel(stack("rocket", DVec3::ZERO, 6));
    world.add_vessel(stack("neighbour", DVec3::new(80.0, 0.0, 0.0), 4));
    world.add_building(SandboxBuilding::new("launch tower", DVec3::new(15.0, 0.0, 0.0), 40.0));
    world.add_building(SandboxBuilding::new("tank farm", DVec3::new(0.0, 250.0, 0.0), 60.0));

    ScenarioDefinition {
        name: "launchpad".to_string(),
        description: "Full tank detonates on the pad".to_string(),
        world,
        actions: vec![ScheduledAction {
            tick: 0,
            action: ScenarioAction::Combust {
                resources: vec![
                    ("LiquidFuel".to_string(), 360.0),
                    ("Oxidizer".to_string(), 440.0),
                ],
                position: DVec3::new(0.0, 0.0, 5.0),
            },
        }],
        frame_shift: FrameShift::default(),
        ticks: None,
    }
}

/// Several charges close together merge into one wave
fn cluster() -> ScenarioDefinition {
    let mut world = SandboxWorld::new(UniformAtmosphere::sea_level());
    world.add_vessel(stack("target", DVec3::new(300.0, 0.0, 0.0), 3));

    let actions = (0..4)
        .map(|i| ScheduledAction {
            tick: 0,
            action: ScenarioAction::Detonate {
                tnt_kg: 50.0,
                position: DVec3::new(2.0 * i as f64, 0.0, 0.0),
            },
        })
        .collect();

    ScenarioDefinition {
        name: "cluster".to_string(),
        description: "Four 50 kg charges a few metres apart".to_string(),
        world,
        actions,
        frame_shift: FrameShift::default(),
        ticks: None,
    }
}

/// A falling tank ruptures and its propellants react
fn fuel_spill() -> ScenarioDefinition {
    let mut world = SandboxWorld::new(UniformAtmosphere::sea_level());
    world.add_vessel(stack("lander", DVec3::new(30.0, 0.0, 0.0), 3));
    world.add_building(SandboxBuilding::new("hangar", DVec3::new(-60.0, 0.0, 0.0), 50.0));

    ScenarioDefinition {
        name: "fuel_spill".to_string(),
        description: "Ruptured bipropellant tank hits the ground at 40 m/s".to_string(),
        world,
        actions: vec![ScheduledAction {
            tick: 2,
            action: ScenarioAction::Release {
                resources: vec![
                    ("LiquidFuel".to_string(), 180.0),
                    ("Oxidizer".to_string(), 220.0),
                ],
                position: DVec3::ZERO,
                velocity: DVec3::new(0.0, 0.0, -40.0),
            },
        }],
        frame_shift: FrameShift::default(),
        ticks: None,
    }
}

/// Nothing happens without an atmosphere to carry the wave
fn vacuum() -> ScenarioDefinition {
    let mut world = SandboxWorld::new(UniformAtmosphere::vacuum());
    world.add_vessel(stack("station", DVec3::new(10.0, 0.0, 0.0), 4));

    ScenarioDefinition {
        name: "vacuum".to_string(),
        description: "Detonation in orbit".to_string(),
        world,
        actions: vec![ScheduledAction {
            tick: 0,
            action: ScenarioAction::Detonate {
                tnt_kg: 100.0,
                position: DVec3::ZERO,
            },
        }],
        frame_shift: FrameShift::default(),
        ticks: Some(50),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtins_resolve() {
        for name in BUILTIN_SCENARIOS {
            let scenario = ScenarioDefinition::resolve(name).unwrap();
            assert_eq!(&scenario.name, name);
            assert!(!scenario.actions.is_empty());
        }
    }

    #[test]
    fn test_unknown_scenario_is_error() {
        assert!(ScenarioDefinition::resolve("no_such_scenario").is_err());
    }

    #[test]
    fn test_scenario_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launchpad.ron");
        let scenario = launchpad();
        scenario.to_file(&path).unwrap();

        let loaded = ScenarioDefinition::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.name, scenario.name);
        assert_eq!(loaded.actions, scenario.actions);
        assert_eq!(loaded.world.vessels.len(), 2);
    }

    #[test]
    fn test_parse_handwritten_scenario() {
        let scenario: ScenarioDefinition = ron::from_str(
            r#"(
                name: "handwritten",
                actions: [
                    (tick: 5, action: Detonate(tnt_kg: 1.0, position: (0.0, 0.0, 0.0))),
                    (tick: 6, action: Release(
                        resources: [("LiquidFuel", 10.0)],
                        position: (1.0, 0.0, 0.0),
                    )),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(scenario.actions.len(), 2);
        assert!(scenario.world.vessels.is_empty());
        assert!(matches!(
            scenario.actions[1].action,
            ScenarioAction::Release { velocity, .. } if velocity == DVec3::ZERO
        ));
    }
}
