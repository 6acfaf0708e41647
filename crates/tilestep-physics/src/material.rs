//! Surface materials
//!
//! A material is three bounded scalars. Contacting surfaces combine
//! multiplicatively: an actor's effective friction on the ground is its own
//! friction times the ground's, and in the air it is its own times the
//! atmosphere's.

use std::ops::{Add, Div, Mul, Sub};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key of the material used when a lookup misses
pub const DEFAULT_MATERIAL: &str = "default";

/// Key of the material airborne actors combine with
pub const ATMOSPHERE_MATERIAL: &str = "atmosphere";

/// Upper bound of every material scalar
pub const MATERIAL_MAX: f32 = 2.0;

fn bound(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, MATERIAL_MAX) }
}

fn divide(numerator: f32, denominator: f32) -> f32 {
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

/// Friction, traction and elasticity, each in `[0, 2]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMaterial", into = "RawMaterial")]
pub struct PhysicsMaterial {
    friction: f32,
    traction: f32,
    elasticity: f32,
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawMaterial {
    friction: f32,
    traction: f32,
    elasticity: f32,
}

impl Default for RawMaterial {
    fn default() -> Self {
        let material = PhysicsMaterial::default();
        Self {
            friction: material.friction,
            traction: material.traction,
            elasticity: material.elasticity,
        }
    }
}

impl From<RawMaterial> for PhysicsMaterial {
    fn from(raw: RawMaterial) -> Self {
        PhysicsMaterial::new(raw.friction, raw.traction, raw.elasticity)
    }
}

impl From<PhysicsMaterial> for RawMaterial {
    fn from(material: PhysicsMaterial) -> Self {
        Self {
            friction: material.friction,
            traction: material.traction,
            elasticity: material.elasticity,
        }
    }
}

impl PhysicsMaterial {
    /// All three scalars at zero
    pub const ZERO: Self = Self {
        friction: 0.0,
        traction: 0.0,
        elasticity: 0.0,
    };

    /// All three scalars at one, the identity for combination
    pub const ONE: Self = Self {
        friction: 1.0,
        traction: 1.0,
        elasticity: 1.0,
    };

    /// Create a material; each scalar is clamped into `[0, 2]`
    pub fn new(friction: f32, traction: f32, elasticity: f32) -> Self {
        Self {
            friction: bound(friction),
            traction: bound(traction),
            elasticity: bound(elasticity),
        }
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn traction(&self) -> f32 {
        self.traction
    }

    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    /// Combine two contacting surfaces
    pub fn combine(self, other: PhysicsMaterial) -> PhysicsMaterial {
        self * other
    }
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::new(0.2, 1.0, 0.0)
    }
}

impl Add for PhysicsMaterial {
    type Output = PhysicsMaterial;

    fn add(self, rhs: PhysicsMaterial) -> PhysicsMaterial {
        PhysicsMaterial::new(
            self.friction + rhs.friction,
            self.traction + rhs.traction,
            self.elasticity + rhs.elasticity,
        )
    }
}

impl Sub for PhysicsMaterial {
    type Output = PhysicsMaterial;

    fn sub(self, rhs: PhysicsMaterial) -> PhysicsMaterial {
        PhysicsMaterial::new(
            self.friction - rhs.friction,
            self.traction - rhs.traction,
            self.elasticity - rhs.elasticity,
        )
    }
}

impl Mul for PhysicsMaterial {
    type Output = PhysicsMaterial;

    fn mul(self, rhs: PhysicsMaterial) -> PhysicsMaterial {
        PhysicsMaterial::new(
            self.friction * rhs.friction,
            self.traction * rhs.traction,
            self.elasticity * rhs.elasticity,
        )
    }
}

impl Mul<f32> for PhysicsMaterial {
    type Output = PhysicsMaterial;

    fn mul(self, rhs: f32) -> PhysicsMaterial {
        PhysicsMaterial::new(self.friction * rhs, self.traction * rhs, self.elasticity * rhs)
    }
}

/// Component-wise division; a zero divisor yields zero for that component
impl Div for PhysicsMaterial {
    type Output = PhysicsMaterial;

    fn div(self, rhs: PhysicsMaterial) -> PhysicsMaterial {
        PhysicsMaterial::new(
            divide(self.friction, rhs.friction),
            divide(self.traction, rhs.traction),
            divide(self.elasticity, rhs.elasticity),
        )
    }
}

impl Div<f32> for PhysicsMaterial {
    type Output = PhysicsMaterial;

    fn div(self, rhs: f32) -> PhysicsMaterial {
        PhysicsMaterial::new(
            divide(self.friction, rhs),
            divide(self.traction, rhs),
            divide(self.elasticity, rhs),
        )
    }
}

/// Materials by key, with `default` and `atmosphere` always present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, PhysicsMaterial>", into = "IndexMap<String, PhysicsMaterial>")]
pub struct MaterialLibrary {
    materials: IndexMap<String, PhysicsMaterial>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::from(IndexMap::new())
    }

    /// Add or replace a material
    pub fn insert(&mut self, key: impl Into<String>, material: PhysicsMaterial) {
        self.materials.insert(key.into(), material);
    }

    /// Look up a material, falling back to the default
    pub fn get(&self, key: &str) -> PhysicsMaterial {
        match self.materials.get(key) {
            Some(material) => *material,
            None => {
                log::warn!("Material '{}' not found, using '{}'", key, DEFAULT_MATERIAL);
                self.default_material()
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.materials.contains_key(key)
    }

    pub fn default_material(&self) -> PhysicsMaterial {
        self.materials.get(DEFAULT_MATERIAL).copied().unwrap_or_default()
    }

    pub fn atmosphere(&self) -> PhysicsMaterial {
        self.materials
            .get(ATMOSPHERE_MATERIAL)
            .copied()
            .unwrap_or_else(default_atmosphere)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PhysicsMaterial)> {
        self.materials.iter().map(|(key, material)| (key.as_str(), material))
    }
}

fn default_atmosphere() -> PhysicsMaterial {
    PhysicsMaterial::new(0.1, 0.5, 1.0)
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl From<IndexMap<String, PhysicsMaterial>> for MaterialLibrary {
    fn from(mut materials: IndexMap<String, PhysicsMaterial>) -> Self {
        materials
            .entry(DEFAULT_MATERIAL.to_string())
            .or_insert_with(PhysicsMaterial::default);
        materials
            .entry(ATMOSPHERE_MATERIAL.to_string())
            .or_insert_with(default_atmosphere);
        Self { materials }
    }
}

impl From<MaterialLibrary> for IndexMap<String, PhysicsMaterial> {
    fn from(library: MaterialLibrary) -> Self {
        library.materials
    }
}
