//! Bodies
//!
//! A body is one of three kinds:
//! - **Actor**: moves by whole units, collides, can be pushed and carried
//! - **Solid**: moves by whole units ignoring collisions, shoves actors aside
//! - **Tile**: static level geometry created from tile layers
//!
//! Actors opt into extra behaviour through [`BodyFeatures`]: sliding around
//! corners and slopes, gravity with grounding, and player control. Bodies are
//! described by a serialisable [`BodyDesc`] and registered with the world,
//! which owns the runtime [`Body`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tilestep_core::{BodyId, Directions, Vec2};

use crate::collider::Collider;
use crate::contact::Contact;
use crate::error::{PhysicsError, PhysicsResult};
use crate::geometry::Shape;
use crate::gravity::GravitySettings;
use crate::integrator::Motion;
use crate::material::{DEFAULT_MATERIAL, PhysicsMaterial};
use crate::player::{PlayerSettings, PlayerState};
use crate::slide::SlideSettings;

/// Body kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    #[default]
    Actor,
    Solid,
    Tile,
}

bitflags! {
    /// Optional actor behaviours
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct BodyFeatures: u8 {
        const SLIDE = 1 << 0;
        const GRAVITY = 1 << 1;
        /// Implies gravity
        const PLAYER = 1 << 2;
    }
}

/// Mass-like tuning for pushing and being pushed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorSettings {
    pub weight: f32,
    pub strength: f32,
    pub pushable: bool,
    pub can_push: bool,
    /// Never moved by pushes or solids
    pub immovable: bool,
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            weight: 1.0,
            strength: 1.0,
            pushable: true,
            can_push: true,
            immovable: false,
        }
    }
}

/// Serializable description of a body to register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyDesc {
    pub name: Option<String>,
    pub kind: BodyKind,
    pub position: Vec2,
    /// Step units per tick
    pub velocity: Vec2,
    pub colliders: Vec<Collider>,
    pub material: String,
    pub features: BodyFeatures,
    pub actor: ActorSettings,
    pub slide: SlideSettings,
    pub gravity: GravitySettings,
    pub player: PlayerSettings,
    /// Collider used for grounding; defaults to the lowest one
    pub ground_collider: Option<usize>,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            name: None,
            kind: BodyKind::Actor,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            colliders: Vec::new(),
            material: DEFAULT_MATERIAL.to_string(),
            features: BodyFeatures::empty(),
            actor: ActorSettings::default(),
            slide: SlideSettings::default(),
            gravity: GravitySettings::default(),
            player: PlayerSettings::default(),
            ground_collider: None,
        }
    }
}

impl BodyDesc {
    pub fn actor(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn solid(position: Vec2) -> Self {
        Self {
            kind: BodyKind::Solid,
            position,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }

    pub fn with_features(mut self, features: BodyFeatures) -> Self {
        self.features |= features;
        self
    }

    pub fn with_actor(mut self, actor: ActorSettings) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_slide(mut self, slide: SlideSettings) -> Self {
        self.slide = slide;
        self.with_features(BodyFeatures::SLIDE)
    }

    pub fn with_gravity(mut self, gravity: GravitySettings) -> Self {
        self.gravity = gravity;
        self.with_features(BodyFeatures::GRAVITY)
    }

    pub fn with_player(mut self, player: PlayerSettings) -> Self {
        self.player = player;
        self.with_features(BodyFeatures::PLAYER | BodyFeatures::GRAVITY)
    }

    pub fn with_ground_collider(mut self, index: usize) -> Self {
        self.ground_collider = Some(index);
        self
    }

    /// Label used in logs and errors
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("{:?} at {}", self.kind, self.position))
    }
}

/// A registered body
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) id: BodyId,
    pub(crate) name: Option<String>,
    pub(crate) kind: BodyKind,
    pub(crate) features: BodyFeatures,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) colliders: SmallVec<[Collider; 2]>,
    pub(crate) material: PhysicsMaterial,
    pub(crate) motion: Motion,
    pub(crate) actor: ActorSettings,
    pub(crate) moveable: Directions,
    pub(crate) sliding: Directions,
    pub(crate) slide: SlideSettings,
    pub(crate) gravity: GravitySettings,
    pub(crate) ground_collider: usize,
    pub(crate) ground: Option<Contact>,
    pub(crate) player: Option<PlayerState>,
    /// Mid-move; cannot be pushed until the move finishes
    pub(crate) moving: bool,
    pub(crate) level: Option<usize>,
    pub(crate) cell: Option<usize>,
}

impl Body {
    /// Build an actor or solid from its description
    pub(crate) fn from_desc(id: BodyId, desc: BodyDesc, material: PhysicsMaterial) -> PhysicsResult<Self> {
        if desc.kind == BodyKind::Tile {
            return Err(PhysicsError::InvalidConfig(format!(
                "{}: tiles come from level layers and cannot be registered",
                desc.label()
            )));
        }
        if desc.colliders.is_empty() {
            return Err(PhysicsError::NoColliders(desc.label()));
        }
        if let Some(collider) = desc.colliders.iter().find(|collider| collider.is_degenerate()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "{}: degenerate collider {:?}",
                desc.label(),
                collider.shape
            )));
        }

        let mut features = desc.features;
        if features.contains(BodyFeatures::PLAYER) {
            features |= BodyFeatures::GRAVITY;
        }
        if desc.kind == BodyKind::Solid {
            features = BodyFeatures::empty();
        }

        let ground_collider = match desc.ground_collider {
            Some(index) if index >= desc.colliders.len() => {
                return Err(PhysicsError::InvalidGroundCollider {
                    index,
                    count: desc.colliders.len(),
                });
            }
            Some(index) => index,
            None => lowest_collider(&desc.colliders),
        };

        let player = features
            .contains(BodyFeatures::PLAYER)
            .then(|| PlayerState::new(desc.player));

        Ok(Self {
            id,
            name: desc.name,
            kind: desc.kind,
            features,
            position: desc.position,
            velocity: desc.velocity,
            colliders: desc.colliders.into_iter().collect(),
            material,
            motion: Motion::default(),
            actor: desc.actor,
            moveable: Directions::all(),
            sliding: Directions::empty(),
            slide: desc.slide,
            gravity: desc.gravity,
            ground_collider,
            ground: None,
            player,
            moving: false,
            level: None,
            cell: None,
        })
    }

    /// A static tile body
    pub(crate) fn tile(id: BodyId, position: Vec2, collider: Collider, material: PhysicsMaterial, level: usize) -> Self {
        Self {
            id,
            name: None,
            kind: BodyKind::Tile,
            features: BodyFeatures::empty(),
            position,
            velocity: Vec2::ZERO,
            colliders: SmallVec::from_elem(collider, 1),
            material,
            motion: Motion::default(),
            actor: ActorSettings {
                pushable: false,
                can_push: false,
                immovable: true,
                ..ActorSettings::default()
            },
            moveable: Directions::empty(),
            sliding: Directions::empty(),
            slide: SlideSettings::default(),
            gravity: GravitySettings::default(),
            ground_collider: 0,
            ground: None,
            player: None,
            moving: false,
            level: Some(level),
            cell: None,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn features(&self) -> BodyFeatures {
        self.features
    }

    pub fn has(&self, features: BodyFeatures) -> bool {
        self.features.contains(features)
    }

    pub fn is_actor(&self) -> bool {
        self.kind == BodyKind::Actor
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    /// Colliders placed at the current position
    pub fn shapes(&self) -> SmallVec<[Shape; 2]> {
        self.colliders.iter().map(|collider| collider.place(self.position)).collect()
    }

    pub fn material(&self) -> PhysicsMaterial {
        self.material
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn actor_settings(&self) -> &ActorSettings {
        &self.actor
    }

    pub fn slide_settings(&self) -> &SlideSettings {
        &self.slide
    }

    pub fn gravity_settings(&self) -> &GravitySettings {
        &self.gravity
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.player.as_ref()
    }

    /// Index of the level the body is currently in
    pub fn level(&self) -> Option<usize> {
        self.level
    }

    /// Largest distance from the position to any collider bound
    pub fn reach(&self) -> f32 {
        self.colliders.iter().fold(0.0, |reach, collider| reach.max(collider.reach()))
    }

    pub(crate) fn ground_shape(&self) -> Option<Shape> {
        self.colliders.get(self.ground_collider).map(|collider| collider.place(self.position))
    }
}

fn lowest_collider(colliders: &[Collider]) -> usize {
    colliders
        .iter()
        .enumerate()
        .fold((0, f32::INFINITY), |(best, lowest), (index, collider)| {
            let bottom = collider.local_bottom();
            if bottom < lowest { (index, bottom) } else { (best, lowest) }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Collider {
        Collider::square(Vec2::ONE)
    }

    #[test]
    fn test_player_implies_gravity() {
        let desc = BodyDesc::actor(Vec2::ZERO)
            .with_collider(unit_square())
            .with_features(BodyFeatures::PLAYER);
        let body = Body::from_desc(BodyId::new(0, 0), desc, PhysicsMaterial::default()).unwrap();
        assert!(body.has(BodyFeatures::GRAVITY));
        assert!(body.player().is_some());
    }

    #[test]
    fn test_ground_collider_defaults_to_lowest() {
        let desc = BodyDesc::actor(Vec2::ZERO)
            .with_collider(unit_square().with_centre(Vec2::new(0.0, 1.0)))
            .with_collider(Collider::circle(0.4).with_centre(Vec2::new(0.0, -0.2)));
        let body = Body::from_desc(BodyId::new(0, 0), desc, PhysicsMaterial::default()).unwrap();
        assert_eq!(body.ground_collider, 1);
    }

    #[test]
    fn test_registration_errors() {
        let material = PhysicsMaterial::default();
        let empty = BodyDesc::actor(Vec2::ZERO).with_name("ghost");
        assert!(matches!(
            Body::from_desc(BodyId::new(0, 0), empty, material),
            Err(PhysicsError::NoColliders(name)) if name == "ghost"
        ));

        let bad_ground = BodyDesc::actor(Vec2::ZERO).with_collider(unit_square()).with_ground_collider(3);
        assert!(matches!(
            Body::from_desc(BodyId::new(0, 0), bad_ground, material),
            Err(PhysicsError::InvalidGroundCollider { index: 3, count: 1 })
        ));

        let tile = BodyDesc {
            kind: BodyKind::Tile,
            ..BodyDesc::actor(Vec2::ZERO).with_collider(unit_square())
        };
        assert!(Body::from_desc(BodyId::new(0, 0), tile, material).is_err());

        let flat = BodyDesc::actor(Vec2::ZERO).with_collider(Collider::square(Vec2::new(1.0, 0.0)));
        assert!(Body::from_desc(BodyId::new(0, 0), flat, material).is_err());
    }

    #[test]
    fn test_solids_drop_actor_features() {
        let desc = BodyDesc::solid(Vec2::ZERO)
            .with_collider(unit_square())
            .with_features(BodyFeatures::GRAVITY | BodyFeatures::SLIDE);
        let body = Body::from_desc(BodyId::new(0, 0), desc, PhysicsMaterial::default()).unwrap();
        assert!(body.features().is_empty());
    }

    #[test]
    fn test_desc_from_json() {
        let json = r#"{
            "name": "crate",
            "position": [1.0, 2.0],
            "colliders": [{ "shape": { "type": "square", "size": [1.0, 1.0] } }],
            "features": "GRAVITY | SLIDE",
            "actor": { "weight": 3.0 }
        }"#;
        let desc: BodyDesc = serde_json::from_str(json).unwrap();
        assert_eq!(desc.position, Vec2::new(1.0, 2.0));
        assert_eq!(desc.features, BodyFeatures::GRAVITY | BodyFeatures::SLIDE);
        assert_eq!(desc.actor.weight, 3.0);
        assert!(desc.actor.pushable);
        assert_eq!(desc.material, DEFAULT_MATERIAL);
    }
}
