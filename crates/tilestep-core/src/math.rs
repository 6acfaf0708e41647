//! Math utilities
//!
//! Re-exports from glam plus the small amount of 2D vocabulary the physics
//! crate is written in: boxes, axes, cardinal directions and sign helpers.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Axis-aligned bounding box in world space (y up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner (left, bottom)
    pub min: Vec2,
    /// Maximum corner (right, top)
    pub max: Vec2,
}

impl Aabb {
    /// An inverted box that any point expands
    pub const EMPTY: Self = Self {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    /// Create a box from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a box from its center and full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn bottom(&self) -> f32 {
        self.min.y
    }

    pub fn top(&self) -> f32 {
        self.max.y
    }

    /// Get the full size of the box
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if the box is empty
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Check if this box touches or overlaps another
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Check if this box overlaps another with positive area
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Expand the box to include a point
    pub fn expand_to_include(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// One of the two movement axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The other axis
    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Read this axis' component of a vector
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }

    /// Mutable access to this axis' component of a vector
    pub fn of_mut(self, v: &mut Vec2) -> &mut f32 {
        match self {
            Axis::Horizontal => &mut v.x,
            Axis::Vertical => &mut v.y,
        }
    }

    /// Unit vector along this axis scaled by `sign`
    pub fn unit(self, sign: f32) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::new(sign, 0.0),
            Axis::Vertical => Vec2::new(0.0, sign),
        }
    }
}

/// Cardinal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// The direction of travel for `sign` along `axis`
    pub fn from_axis(axis: Axis, sign: f32) -> Direction {
        match (axis, sign < 0.0) {
            (Axis::Horizontal, false) => Direction::Right,
            (Axis::Horizontal, true) => Direction::Left,
            (Axis::Vertical, false) => Direction::Up,
            (Axis::Vertical, true) => Direction::Down,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// +1 for up/right, -1 for down/left
    pub fn sign(self) -> f32 {
        match self {
            Direction::Up | Direction::Right => 1.0,
            Direction::Down | Direction::Left => -1.0,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit vector pointing this way
    pub fn vector(self) -> Vec2 {
        self.axis().unit(self.sign())
    }
}

bitflags! {
    /// A set of cardinal directions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Directions: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const VERTICAL = Self::UP.bits() | Self::DOWN.bits();
        const HORIZONTAL = Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl Directions {
    /// Both directions along an axis
    pub fn along(axis: Axis) -> Directions {
        match axis {
            Axis::Horizontal => Directions::HORIZONTAL,
            Axis::Vertical => Directions::VERTICAL,
        }
    }
}

impl From<Direction> for Directions {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Directions::UP,
            Direction::Down => Directions::DOWN,
            Direction::Left => Directions::LEFT,
            Direction::Right => Directions::RIGHT,
        }
    }
}

/// Sign of a value where zero counts as positive
pub fn sign(value: f32) -> f32 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

/// Clamp to the unit interval
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
