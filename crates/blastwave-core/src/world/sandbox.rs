//! Self-contained world for headless runs and tests
//!
//! Vessels are flat lists of box-shaped parts and the atmosphere is the same
//! everywhere. Hosts with a real scene graph implement [`BlastWorld`] directly.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::environment::{
    Atmosphere, AtmosphereSample, BlastWorld, DamageableBuilding, DamageablePart, JointStrength,
};

/// Atmosphere with identical conditions at every position
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniformAtmosphere(pub AtmosphereSample);

impl UniformAtmosphere {
    pub fn sea_level() -> Self {
        Self(AtmosphereSample::sea_level())
    }

    pub fn vacuum() -> Self {
        Self(AtmosphereSample::VACUUM)
    }
}

impl Default for UniformAtmosphere {
    fn default() -> Self {
        Self::sea_level()
    }
}

impl Atmosphere for UniformAtmosphere {
    fn sample(&self, _position: DVec3) -> AtmosphereSample {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartState {
    #[default]
    Attached,
    Detached,
    Destroyed,
}

/// Box-shaped part
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SandboxPart {
    pub name: String,
    pub position: DVec3,
    /// Area of the faces normal to each axis (m²)
    pub face_areas: DVec3,
    pub crash_tolerance: f64,
    #[serde(default)]
    pub joint: Option<JointStrength>,
    #[serde(default)]
    pub state: PartState,
    /// Sum of every impulse the part received (N·s)
    #[serde(default)]
    pub accumulated_impulse: DVec3,
}

impl SandboxPart {
    pub fn new(name: impl Into<String>, position: DVec3, face_areas: DVec3, crash_tolerance: f64) -> Self {
        Self {
            name: name.into(),
            position,
            face_areas,
            crash_tolerance,
            joint: None,
            state: PartState::Attached,
            accumulated_impulse: DVec3::ZERO,
        }
    }

    pub fn with_joint(mut self, joint: JointStrength) -> Self {
        self.joint = Some(joint);
        self
    }
}

impl DamageablePart for SandboxPart {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn projected_area(&self, direction: DVec3) -> f64 {
        let d = direction.normalize_or_zero().abs();
        self.face_areas.dot(d)
    }

    fn crash_tolerance(&self) -> f64 {
        self.crash_tolerance
    }

    fn joint_mut(&mut self) -> Option<&mut JointStrength> {
        if self.state == PartState::Attached {
            self.joint.as_mut()
        } else {
            None
        }
    }

    fn detach(&mut self) {
        if self.state == PartState::Attached {
            log::debug!("Part '{}' detached", self.name);
            self.state = PartState::Detached;
        }
    }

    fn destroy(&mut self) {
        if self.state != PartState::Destroyed {
            log::debug!("Part '{}' destroyed", self.name);
            self.state = PartState::Destroyed;
        }
    }

    fn is_destroyed(&self) -> bool {
        self.state == PartState::Destroyed
    }

    fn apply_impulse(&mut self, impulse: DVec3) {
        self.accumulated_impulse += impulse;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SandboxVessel {
    pub name: String,
    pub position: DVec3,
    pub parts: Vec<SandboxPart>,
}

impl SandboxVessel {
    pub fn new(name: impl Into<String>, position: DVec3) -> Self {
        Self {
            name: name.into(),
            position,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: SandboxPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn intact_parts(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| p.state != PartState::Destroyed)
            .count()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SandboxBuilding {
    pub name: String,
    pub position: DVec3,
    pub impact_threshold: f64,
    #[serde(default)]
    pub damage: f64,
}

impl SandboxBuilding {
    pub fn new(name: impl Into<String>, position: DVec3, impact_threshold: f64) -> Self {
        Self {
            name: name.into(),
            position,
            impact_threshold,
            damage: 0.0,
        }
    }
}

impl DamageableBuilding for SandboxBuilding {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn impact_threshold(&self) -> f64 {
        self.impact_threshold
    }

    fn add_damage(&mut self, amount: f64) {
        self.damage += amount;
    }
}

/// Vessels, buildings and a uniform atmosphere
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SandboxWorld {
    #[serde(default)]
    pub atmosphere: UniformAtmosphere,
    #[serde(default)]
    pub vessels: Vec<SandboxVessel>,
    #[serde(default)]
    pub buildings: Vec<SandboxBuilding>,
}

impl SandboxWorld {
    pub fn new(atmosphere: UniformAtmosphere) -> Self {
        Self {
            atmosphere,
            vessels: Vec::new(),
            buildings: Vec::new(),
        }
    }

    pub fn add_vessel(&mut self, vessel: SandboxVessel) -> usize {
        self.vessels.push(vessel);
        self.vessels.len() - 1
    }

    pub fn add_building(&mut self, building: SandboxBuilding) -> usize {
        self.buildings.push(building);
        self.buildings.len() - 1
    }

    /// Move every vessel and building by `offset`
    pub fn translate(&mut self, offset: DVec3) {
        for vessel in &mut self.vessels {
            vessel.position += offset;
            for part in &mut vessel.parts {
                part.position += offset;
            }
        }
        for building in &mut self.buildings {
            building.position += offset;
        }
    }
}

impl Atmosphere for SandboxWorld {
    fn sample(&self, position: DVec3) -> AtmosphereSample {
        self.atmosphere.sample(position)
    }
}

impl BlastWorld for SandboxWorld {
    type Part = SandboxPart;
    type Building = SandboxBuilding;

    fn vessel_count(&self) -> usize {
        self.vessels.len()
    }

    fn vessel_position(&self, vessel: usize) -> DVec3 {
        self.vessels[vessel].position
    }

    fn vessel_parts_mut(&mut self, vessel: usize) -> &mut [SandboxPart] {
        &mut self.vessels[vessel].parts
    }

    fn buildings_mut(&mut self) -> &mut [SandboxBuilding] {
        &mut self.buildings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_part() -> SandboxPart {
        SandboxPart::new("crate", DVec3::ZERO, DVec3::new(2.0, 3.0, 4.0), 10.0)
            .with_joint(JointStrength::new(100.0, 100.0))
    }

    #[test]
    fn test_projected_area_along_axes() {
        let part = crate_part();
        assert_eq!(part.projected_area(DVec3::X), 2.0);
        assert_eq!(part.projected_area(-DVec3::Y), 3.0);
        assert_eq!(part.projected_area(DVec3::Z * 5.0), 4.0);
        assert_eq!(part.projected_area(DVec3::ZERO), 0.0);
    }

    #[test]
    fn test_projected_area_diagonal() {
        let part = crate_part();
        let area = part.projected_area(DVec3::new(1.0, 1.0, 0.0));
        let expected = (2.0 + 3.0) / 2f64.sqrt();
        assert!((area - expected).abs() < 1e-12);
    }

    #[test]
    fn test_detached_part_has_no_joint() {
        let mut part = crate_part();
        assert!(part.joint_mut().is_some());
        part.detach();
        assert_eq!(part.state, PartState::Detached);
        assert!(part.joint_mut().is_none());
    }

    #[test]
    fn test_destroy_is_final() {
        let mut part = crate_part();
        part.destroy();
        part.detach();
        assert!(part.is_destroyed());
        assert_eq!(part.state, PartState::Destroyed);
    }

    #[test]
    fn test_impulse_accumulates() {
        let mut part = crate_part();
        part.apply_impulse(DVec3::new(1.0, 0.0, 0.0));
        part.apply_impulse(DVec3::new(2.0, 1.0, 0.0));
        assert_eq!(part.accumulated_impulse, DVec3::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn test_world_exposes_vessels_and_buildings() {
        let mut world = SandboxWorld::new(UniformAtmosphere::sea_level());
        let v = world.add_vessel(SandboxVessel::new("satellite", DVec3::X).with_part(crate_part()));
        world.add_building(SandboxBuilding::new("hangar", DVec3::Y, 50.0));

        assert_eq!(world.vessel_count(), 1);
        assert_eq!(world.vessel_position(v), DVec3::X);
        assert_eq!(world.vessel_parts_mut(v).len(), 1);
        world.buildings_mut()[0].add_damage(5.0);
        assert_eq!(world.buildings[0].damage, 5.0);
        assert_eq!(world.sample(DVec3::ZERO), AtmosphereSample::sea_level());
    }

    #[test]
    fn test_translate_moves_everything() {
        let mut world = SandboxWorld::default();
        world.add_vessel(SandboxVessel::new("satellite", DVec3::ZERO).with_part(crate_part()));
        world.add_building(SandboxBuilding::new("hangar", DVec3::ZERO, 50.0));
        world.translate(DVec3::new(0.0, 0.0, 7.0));

        assert_eq!(world.vessels[0].position.z, 7.0);
        assert_eq!(world.vessels[0].parts[0].position.z, 7.0);
        assert_eq!(world.buildings[0].position.z, 7.0);
    }

    #[test]
    fn test_world_from_ron() {
        let world: SandboxWorld = ron::from_str(
            r#"(
                vessels: [(
                    name: "satellite",
                    position: (1.0, 0.0, 0.0),
                    parts: [(
                        name: "tank",
                        position: (1.0, 0.0, 0.0),
                        face_areas: (1.0, 1.0, 1.0),
                        crash_tolerance: 8.0,
                        joint: Some((breaking_force: 50.0, breaking_torque: 50.0)),
                    )],
                )],
            )"#,
        )
        .unwrap();

        assert_eq!(world.atmosphere, UniformAtmosphere::sea_level());
        assert_eq!(world.vessels[0].parts[0].state, PartState::Attached);
        assert!(world.buildings.is_empty());
    }
}
