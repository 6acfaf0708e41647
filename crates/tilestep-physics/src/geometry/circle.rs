use serde::{Deserialize, Serialize};
use tilestep_core::{Aabb, Axis, Vec2};

/// How permissive a circle's directional contact tests are
///
/// A directional contact is reported when the direction of travel and the
/// vector to the contact point are within the profile's angle. `Grounded` is
/// tuned for circles carrying gravity: it needs a bounding-box overlap first
/// and uses a tighter cone downward so that slopes read as ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircleProfile {
    #[default]
    Standard,
    Grounded,
}

impl CircleProfile {
    /// Cone half-angle in degrees for moves along `axis`
    pub fn collision_angle(self, axis: Axis) -> f32 {
        match (self, axis) {
            (CircleProfile::Standard, _) => 90.0,
            (CircleProfile::Grounded, Axis::Horizontal) => 85.0,
            (CircleProfile::Grounded, Axis::Vertical) => 60.0,
        }
    }

    /// Whether directional tests first require overlapping bounds
    pub fn requires_bounds_overlap(self) -> bool {
        matches!(self, CircleProfile::Grounded)
    }
}

/// Circle placed in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub position: Vec2,
    pub radius: f32,
    pub profile: CircleProfile,
}

impl Circle {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            profile: CircleProfile::Standard,
        }
    }

    pub fn with_profile(mut self, profile: CircleProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn left(&self) -> f32 {
        self.position.x - self.radius
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.radius
    }

    pub fn top(&self) -> f32 {
        self.position.y + self.radius
    }

    pub fn bottom(&self) -> f32 {
        self.position.y - self.radius
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.position, Vec2::splat(self.radius * 2.0))
    }

    /// Boundary-inclusive containment
    pub fn interior(&self, point: Vec2) -> bool {
        (point - self.position).length() <= self.radius
    }

    /// Point on the boundary in the direction of `target`
    pub fn surface_toward(&self, target: Vec2) -> Vec2 {
        self.position + (target - self.position).normalize_or_zero() * self.radius
    }
}
