use tilestep_core::{Aabb, Axis, Vec2};

use super::Edge;

/// Axis-aligned rectangle placed in world space
///
/// Corners follow a Z layout: `a` top-left, `b` top-right, `c` bottom-left,
/// `d` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Square {
    pub position: Vec2,
    pub size: Vec2,
}

impl Square {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub fn left(&self) -> f32 {
        self.position.x - self.size.x * 0.5
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x * 0.5
    }

    pub fn top(&self) -> f32 {
        self.position.y + self.size.y * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.position.y - self.size.y * 0.5
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }

    pub fn a(&self) -> Vec2 {
        Vec2::new(self.left(), self.top())
    }

    pub fn b(&self) -> Vec2 {
        Vec2::new(self.right(), self.top())
    }

    pub fn c(&self) -> Vec2 {
        Vec2::new(self.left(), self.bottom())
    }

    pub fn d(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    /// Top face
    pub fn ab(&self) -> Edge {
        Edge::new(self.a(), self.b())
    }

    /// Left face
    pub fn ac(&self) -> Edge {
        Edge::new(self.a(), self.c())
    }

    /// Right face
    pub fn bd(&self) -> Edge {
        Edge::new(self.b(), self.d())
    }

    /// Bottom face
    pub fn cd(&self) -> Edge {
        Edge::new(self.c(), self.d())
    }

    /// All four faces, sides first
    pub fn edges(&self) -> [Edge; 4] {
        [self.ac(), self.bd(), self.ab(), self.cd()]
    }

    /// The face leading a move of `sign` along `axis`
    pub fn leading_edge(&self, axis: Axis, sign: f32) -> Edge {
        match (axis, sign > 0.0) {
            (Axis::Horizontal, true) => self.bd(),
            (Axis::Horizontal, false) => self.ac(),
            (Axis::Vertical, true) => self.ab(),
            (Axis::Vertical, false) => self.cd(),
        }
    }

    /// Boundary-inclusive containment via projection onto two sides
    pub fn interior(&self, point: Vec2) -> bool {
        let (a, b, c) = (self.a(), self.b(), self.c());
        let ab_am = (b - a).dot(point - a);
        let ab_ab = (b - a).dot(b - a);
        let ac_am = (c - a).dot(point - a);
        let ac_ac = (c - a).dot(c - a);

        (0.0..=ab_ab).contains(&ab_am) && (0.0..=ac_ac).contains(&ac_am)
    }

    /// Corners in winding order, used by the overlap solver
    pub(crate) fn vertices(&self) -> [Vec2; 4] {
        [self.a(), self.b(), self.d(), self.c()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents() {
        let square = Square::new(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0));
        assert_eq!(square.left(), 0.0);
        assert_eq!(square.right(), 2.0);
        assert_eq!(square.top(), 4.0);
        assert_eq!(square.bottom(), 0.0);
        assert_eq!(square.a(), Vec2::new(0.0, 4.0));
        assert_eq!(square.d(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_interior_is_boundary_inclusive() {
        let square = Square::new(Vec2::ZERO, Vec2::ONE);
        assert!(square.interior(Vec2::ZERO));
        assert!(square.interior(Vec2::new(0.5, 0.5)));
        assert!(!square.interior(Vec2::new(0.6, 0.0)));
    }

    #[test]
    fn test_leading_edges() {
        let square = Square::new(Vec2::ZERO, Vec2::splat(2.0));
        assert_eq!(square.leading_edge(Axis::Horizontal, 1.0).original_left(), 1.0);
        assert_eq!(square.leading_edge(Axis::Horizontal, -1.0).original_right(), -1.0);
        assert_eq!(square.leading_edge(Axis::Vertical, 1.0).original_bottom(), 1.0);
        assert_eq!(square.leading_edge(Axis::Vertical, -1.0).original_top(), -1.0);
    }
}
