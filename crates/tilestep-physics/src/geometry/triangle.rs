use smallvec::SmallVec;
use tilestep_core::{Aabb, Direction, Vec2};

use super::Edge;

/// Triangle placed in world space, positioned at its centroid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub position: Vec2,
    pub points: [Vec2; 3],
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

impl Triangle {
    /// Build from three world-space corners
    pub fn from_points(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self {
            position: (a + b + c) / 3.0,
            points: [a, b, c],
        }
    }

    pub fn a(&self) -> Vec2 {
        self.points[0]
    }

    pub fn b(&self) -> Vec2 {
        self.points[1]
    }

    pub fn c(&self) -> Vec2 {
        self.points[2]
    }

    pub fn ab(&self) -> Edge {
        Edge::new(self.a(), self.b())
    }

    pub fn bc(&self) -> Edge {
        Edge::new(self.b(), self.c())
    }

    pub fn ca(&self) -> Edge {
        Edge::new(self.c(), self.a())
    }

    pub fn edges(&self) -> [Edge; 3] {
        [self.ab(), self.bc(), self.ca()]
    }

    pub fn left(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    pub fn right(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn top(&self) -> f32 {
        self.points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn bottom(&self) -> f32 {
        self.points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min)
    }

    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::EMPTY;
        for point in self.points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Leftmost corner, lowest on ties
    pub fn left_point(&self) -> Vec2 {
        self.extreme(|p, best| p.x < best.x || (p.x == best.x && p.y < best.y))
    }

    /// Rightmost corner, lowest on ties
    pub fn right_point(&self) -> Vec2 {
        self.extreme(|p, best| p.x > best.x || (p.x == best.x && p.y < best.y))
    }

    /// Highest corner, leftmost on ties
    pub fn top_point(&self) -> Vec2 {
        self.extreme(|p, best| p.y > best.y || (p.y == best.y && p.x < best.x))
    }

    /// Lowest corner, leftmost on ties
    pub fn bottom_point(&self) -> Vec2 {
        self.extreme(|p, best| p.y < best.y || (p.y == best.y && p.x < best.x))
    }

    fn extreme(&self, better: impl Fn(Vec2, Vec2) -> bool) -> Vec2 {
        let mut best = self.points[0];
        for &point in &self.points[1..] {
            if better(point, best) {
                best = point;
            }
        }
        best
    }

    /// Strict barycentric containment; points on an edge are outside
    pub fn interior(&self, point: Vec2) -> bool {
        let (a, b, c) = (self.a(), self.b(), self.c());
        let total = cross(a, b) + cross(b, c) + cross(c, a);
        if total.abs() <= f32::EPSILON {
            return false;
        }

        let wa = (cross(b, c) + cross(point, b - c)) / total;
        let wb = (cross(c, a) + cross(point, c - a)) / total;
        let wc = (cross(a, b) + cross(point, a - b)) / total;

        let inside = |w: f32| w > 0.0 && w < 1.0;
        inside(wa) && inside(wb) && inside(wc)
    }

    /// Unit normal of `edge` pointing away from the centroid
    pub fn outward_normal(&self, edge: &Edge) -> Vec2 {
        let v = edge.original_vector();
        let normal = Vec2::new(v.y, -v.x).normalize_or_zero();
        if normal.dot(edge.oa() - self.position) < 0.0 { -normal } else { normal }
    }

    /// Edges whose outward normal is within 90 degrees of `direction`
    pub fn edges_facing(&self, direction: Direction) -> SmallVec<[Edge; 3]> {
        let towards = direction.vector();
        self.edges()
            .into_iter()
            .filter(|edge| self.outward_normal(edge).dot(towards) > f32::EPSILON)
            .collect()
    }
}
