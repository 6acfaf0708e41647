//! Ray queries
//!
//! Candidates are gathered by walking the ray one world unit at a time and
//! collecting tiles and grid cells around each sample. Each candidate is then
//! intersected exactly and the nearest entry wins.

use ahash::AHashSet;
use bitflags::bitflags;
use serde::Serialize;
use tilestep_core::{BodyId, Vec2};

use crate::body::BodyKind;
use crate::geometry::{Edge, Shape};
use crate::level::TILE_SIZE;
use crate::world::World;

bitflags! {
    /// Body kinds a ray can hit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BodyMask: u8 {
        const ACTORS = 1 << 0;
        const SOLIDS = 1 << 1;
        const TILES = 1 << 2;
    }
}

impl BodyMask {
    pub fn admits(self, kind: BodyKind) -> bool {
        match kind {
            BodyKind::Actor => self.contains(BodyMask::ACTORS),
            BodyKind::Solid => self.contains(BodyMask::SOLIDS),
            BodyKind::Tile => self.contains(BodyMask::TILES),
        }
    }
}

/// Nearest body along a ray
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RaycastHit {
    pub body: BodyId,
    pub collider: usize,
    /// Distance from the origin to the entry point
    pub distance: f32,
    pub point: Vec2,
}

/// Distance along a unit `direction` at which the ray enters `shape`
fn entry_distance(shape: &Shape, origin: Vec2, direction: Vec2, max: f32) -> Option<f32> {
    if shape.interior(origin) {
        return Some(0.0);
    }
    let distance = match shape {
        Shape::Circle(circle) => {
            let offset = origin - circle.position;
            let b = offset.dot(direction);
            let c = offset.length_squared() - circle.radius * circle.radius;
            let discriminant = b * b - c;
            if discriminant < 0.0 {
                return None;
            }
            let t = -b - discriminant.sqrt();
            if t < 0.0 {
                return None;
            }
            t
        }
        Shape::Square(_) | Shape::Triangle(_) => {
            let ray = Edge::new(origin, origin + direction * max);
            shape
                .edges()
                .iter()
                .filter_map(|edge| ray.intersection_perfect(edge))
                .map(|point| (point - origin).length())
                .min_by(f32::total_cmp)?
        }
    };
    (distance <= max).then_some(distance)
}

impl World {
    /// First body hit by a ray from `origin` toward `direction` within
    /// `distance`, considering only kinds in `mask`
    pub fn raycast(&self, origin: Vec2, direction: Vec2, distance: f32, mask: BodyMask) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || !(distance > 0.0) {
            return None;
        }

        let mut best: Option<RaycastHit> = None;
        for id in self.ray_candidates(origin, direction, distance) {
            let Some(body) = self.bodies.get(id) else {
                continue;
            };
            if !mask.admits(body.kind) {
                continue;
            }
            for (collider, shape) in body.shapes().iter().enumerate() {
                let Some(hit) = entry_distance(shape, origin, direction, distance) else {
                    continue;
                };
                if best.is_none_or(|best| hit < best.distance) {
                    best = Some(RaycastHit {
                        body: id,
                        collider,
                        distance: hit,
                        point: origin + direction * hit,
                    });
                }
            }
        }
        best
    }

    /// Bodies near any one-unit sample along the ray, in discovery order
    fn ray_candidates(&self, origin: Vec2, direction: Vec2, distance: f32) -> Vec<BodyId> {
        let mut seen = AHashSet::new();
        let mut candidates = Vec::new();
        let samples = (distance / TILE_SIZE).ceil() as usize;

        for i in 0..=samples {
            let point = origin + direction * (i as f32 * TILE_SIZE).min(distance);
            let Some(level_index) = self.levels.level_at(point) else {
                continue;
            };
            let Some(level) = self.levels.get(level_index) else {
                continue;
            };
            let grid = level.grid();
            let in_cells = grid
                .cell_index(point)
                .into_iter()
                .flat_map(|cell| grid.neighbourhood(cell))
                .flat_map(|cell| cell.actors().iter().chain(cell.solids()).copied());
            let tiles = self.levels.tiles_nearby(level_index, point, 1);

            for id in in_cells.chain(tiles) {
                if seen.insert(id) {
                    candidates.push(id);
                }
            }
        }
        candidates
    }
}
