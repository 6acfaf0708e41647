//! Line segments
//!
//! An [`Edge`] keeps both the endpoints it was built from and a copy pulled
//! inward along the segment by [`EDGE_MARGIN`]. Contact tests use the inset
//! copy so that two boxes meeting only at a corner do not report contact;
//! the "perfect" variants use the original endpoints.

use smallvec::SmallVec;
use tilestep_core::Vec2;

use super::EDGE_MARGIN;

/// Below this squared length an edge (or a quadratic's leading term) is degenerate
const DEGENERATE_EPSILON: f32 = 1e-7;

/// A line segment with inset collision endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    oa: Vec2,
    ob: Vec2,
    a: Vec2,
    b: Vec2,
}

impl Edge {
    /// Create an edge from `oa` to `ob`
    pub fn new(oa: Vec2, ob: Vec2) -> Self {
        let a = oa + (ob - oa).normalize_or_zero() * EDGE_MARGIN;
        let b = ob + (oa - ob).normalize_or_zero() * EDGE_MARGIN;
        Self { oa, ob, a, b }
    }

    /// Inset start point
    pub fn a(&self) -> Vec2 {
        self.a
    }

    /// Inset end point
    pub fn b(&self) -> Vec2 {
        self.b
    }

    /// Original start point
    pub fn oa(&self) -> Vec2 {
        self.oa
    }

    /// Original end point
    pub fn ob(&self) -> Vec2 {
        self.ob
    }

    /// Inset direction vector `b - a`
    pub fn vector(&self) -> Vec2 {
        self.b - self.a
    }

    /// Original direction vector `ob - oa`
    pub fn original_vector(&self) -> Vec2 {
        self.ob - self.oa
    }

    pub fn length(&self) -> f32 {
        self.vector().length()
    }

    /// True when the segment has no usable direction
    pub fn is_degenerate(&self) -> bool {
        self.original_vector().length_squared() <= DEGENERATE_EPSILON
    }

    /// Slope dy/dx, or `None` for a vertical edge
    pub fn gradient(&self) -> Option<f32> {
        let v = self.vector();
        if v.x == 0.0 { None } else { Some(v.y / v.x) }
    }

    pub fn left(&self) -> f32 {
        self.a.x.min(self.b.x)
    }

    pub fn right(&self) -> f32 {
        self.a.x.max(self.b.x)
    }

    pub fn top(&self) -> f32 {
        self.a.y.max(self.b.y)
    }

    pub fn bottom(&self) -> f32 {
        self.a.y.min(self.b.y)
    }

    pub fn original_left(&self) -> f32 {
        self.oa.x.min(self.ob.x)
    }

    pub fn original_right(&self) -> f32 {
        self.oa.x.max(self.ob.x)
    }

    pub fn original_top(&self) -> f32 {
        self.oa.y.max(self.ob.y)
    }

    pub fn original_bottom(&self) -> f32 {
        self.oa.y.min(self.ob.y)
    }

    pub fn left_point(&self) -> Vec2 {
        if self.a.x < self.b.x { self.a } else { self.b }
    }

    pub fn right_point(&self) -> Vec2 {
        if self.a.x > self.b.x { self.a } else { self.b }
    }

    pub fn top_point(&self) -> Vec2 {
        if self.a.y > self.b.y { self.a } else { self.b }
    }

    pub fn bottom_point(&self) -> Vec2 {
        if self.a.y < self.b.y { self.a } else { self.b }
    }

    pub fn original_left_point(&self) -> Vec2 {
        if self.oa.x < self.ob.x { self.oa } else { self.ob }
    }

    pub fn original_right_point(&self) -> Vec2 {
        if self.oa.x > self.ob.x { self.oa } else { self.ob }
    }

    pub fn original_top_point(&self) -> Vec2 {
        if self.oa.y > self.ob.y { self.oa } else { self.ob }
    }

    pub fn original_bottom_point(&self) -> Vec2 {
        if self.oa.y < self.ob.y { self.oa } else { self.ob }
    }

    pub fn midpoint(&self) -> Vec2 {
        self.a.lerp(self.b, 0.5)
    }

    /// The same segment walked the other way
    pub fn inverse(&self) -> Edge {
        Edge::new(self.ob, self.oa)
    }

    /// Check if two edges were built from the same endpoints
    pub fn same_as(&self, other: &Edge) -> bool {
        self.oa == other.oa && self.ob == other.ob
    }

    /// Closest point on the inset segment to `point`
    pub fn nearest(&self, point: Vec2) -> Vec2 {
        let v = self.vector();
        let length = v.length();
        if length <= f32::EPSILON {
            return self.a;
        }
        let direction = v / length;
        let projection = (point - self.a).dot(direction).clamp(0.0, length);
        self.a + direction * projection
    }

    /// Distance from `point` to the inset segment
    pub fn distance_to(&self, point: Vec2) -> f32 {
        (self.nearest(point) - point).length()
    }

    /// Check if the segment comes within `radius` (plus the margin unless `perfect`) of `centre`
    pub fn touches_circle(&self, centre: Vec2, radius: f32, perfect: bool) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let reach = if perfect { radius } else { radius + EDGE_MARGIN };
        self.distance_to(centre) <= reach
    }

    /// Check if two inset segments cross
    ///
    /// Parallel segments count as touching when any endpoint lies within the
    /// margin of the other segment.
    pub fn intersects(&self, other: &Edge) -> bool {
        self.intersection(other).is_some() || self.parallel_touch(other)
    }

    /// Crossing point of two inset segments
    pub fn intersection(&self, other: &Edge) -> Option<Vec2> {
        if self.is_degenerate() || other.is_degenerate() {
            return None;
        }
        segment_crossing(self.a, self.b, other.a, other.b)
    }

    /// Check if the original (un-inset) segments cross; parallel never does
    pub fn intersects_perfect(&self, other: &Edge) -> bool {
        self.intersection_perfect(other).is_some()
    }

    /// Crossing point of the original segments
    pub fn intersection_perfect(&self, other: &Edge) -> Option<Vec2> {
        if self.is_degenerate() || other.is_degenerate() {
            return None;
        }
        segment_crossing(self.oa, self.ob, other.oa, other.ob)
    }

    fn parallel_touch(&self, other: &Edge) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        let v1 = self.vector();
        let v2 = other.vector();
        if v1.y * v2.x - v1.x * v2.y != 0.0 {
            return false;
        }
        self.distance_to(other.a) < EDGE_MARGIN
            || self.distance_to(other.b) < EDGE_MARGIN
            || other.distance_to(self.a) < EDGE_MARGIN
            || other.distance_to(self.b) < EDGE_MARGIN
    }

    /// Points where the inset segment crosses a circle's boundary
    ///
    /// A tangent line yields one point; a secant yields the crossings that
    /// lie strictly inside the segment.
    pub fn circle_intersections(&self, centre: Vec2, radius: f32) -> SmallVec<[Vec2; 2]> {
        let mut points = SmallVec::new();
        let v = self.vector();
        let offset = self.a - centre;

        let u = v.length_squared();
        let w = 2.0 * v.dot(offset);
        let c = offset.length_squared() - radius * radius;
        let discriminant = w * w - 4.0 * u * c;

        if u <= DEGENERATE_EPSILON || discriminant < 0.0 {
            return points;
        }

        if discriminant == 0.0 {
            let t = -w / (2.0 * u);
            if (0.0..=1.0).contains(&t) {
                points.push(self.a + v * t);
            }
            return points;
        }

        let root = discriminant.sqrt();
        for t in [(-w + root) / (2.0 * u), (-w - root) / (2.0 * u)] {
            if t > 0.0 && t < 1.0 {
                points.push(self.a + v * t);
            }
        }
        points
    }
}

/// Parametric segment crossing; `None` when parallel or apart
fn segment_crossing(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<Vec2> {
    let x1 = b.x - a.x;
    let y1 = b.y - a.y;
    let x2 = d.x - c.x;
    let y2 = d.y - c.y;

    let det = y1 * x2 - x1 * y2;
    if det == 0.0 {
        return None;
    }

    let s = ((a.x - c.x) * y2 + (c.y - a.y) * x2) / det;
    let t = ((c.x - a.x) * y1 + (a.y - c.y) * x1) / -det;

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(Vec2::new(a.x + x1 * s, a.y + y1 * s))
    } else {
        None
    }
}
