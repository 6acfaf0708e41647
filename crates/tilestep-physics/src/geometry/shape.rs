use smallvec::SmallVec;
use tilestep_core::{Aabb, Axis, Direction, Vec2};

use super::{
    Circle, Edge, SQUARE_MARGIN_DOWN, SQUARE_MARGIN_HORIZONTAL, SQUARE_MARGIN_UP, Square, TOUCH_MARGIN, Triangle,
    angle_between, overlap,
};

/// A collider placed in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Square(Square),
    Circle(Circle),
    Triangle(Triangle),
}

impl Shape {
    /// World position (centre or centroid)
    pub fn position(&self) -> Vec2 {
        match self {
            Shape::Square(square) => square.position,
            Shape::Circle(circle) => circle.position,
            Shape::Triangle(triangle) => triangle.position,
        }
    }

    pub fn left(&self) -> f32 {
        match self {
            Shape::Square(square) => square.left(),
            Shape::Circle(circle) => circle.left(),
            Shape::Triangle(triangle) => triangle.left(),
        }
    }

    pub fn right(&self) -> f32 {
        match self {
            Shape::Square(square) => square.right(),
            Shape::Circle(circle) => circle.right(),
            Shape::Triangle(triangle) => triangle.right(),
        }
    }

    pub fn top(&self) -> f32 {
        match self {
            Shape::Square(square) => square.top(),
            Shape::Circle(circle) => circle.top(),
            Shape::Triangle(triangle) => triangle.top(),
        }
    }

    pub fn bottom(&self) -> f32 {
        match self {
            Shape::Square(square) => square.bottom(),
            Shape::Circle(circle) => circle.bottom(),
            Shape::Triangle(triangle) => triangle.bottom(),
        }
    }

    pub fn aabb(&self) -> Aabb {
        match self {
            Shape::Square(square) => square.aabb(),
            Shape::Circle(circle) => circle.aabb(),
            Shape::Triangle(triangle) => triangle.aabb(),
        }
    }

    /// The far extent in `direction`, e.g. `top()` for `Up`
    pub fn extent(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Up => self.top(),
            Direction::Down => self.bottom(),
            Direction::Left => self.left(),
            Direction::Right => self.right(),
        }
    }

    pub fn interior(&self, point: Vec2) -> bool {
        match self {
            Shape::Square(square) => square.interior(point),
            Shape::Circle(circle) => circle.interior(point),
            Shape::Triangle(triangle) => triangle.interior(point),
        }
    }

    /// Boundary edges; empty for circles
    pub fn edges(&self) -> SmallVec<[Edge; 4]> {
        match self {
            Shape::Square(square) => SmallVec::from_slice(&square.edges()),
            Shape::Circle(_) => SmallVec::new(),
            Shape::Triangle(triangle) => SmallVec::from_slice(&triangle.edges()),
        }
    }

    /// Check if the shapes overlap
    pub fn colliding(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Square(a), Shape::Square(b)) => a.aabb().overlaps(&b.aabb()),
            (Shape::Circle(a), Shape::Circle(b)) => (b.position - a.position).length() <= a.radius + b.radius,
            (Shape::Circle(circle), polygon) | (polygon, Shape::Circle(circle)) => {
                polygon.interior(circle.position)
                    || polygon
                        .edges()
                        .iter()
                        .any(|edge| edge.touches_circle(circle.position, circle.radius, false))
            }
            (a, b) => {
                a.interior(b.position())
                    || b.interior(a.position())
                    || a.edges().iter().any(|edge| edge.colliding(b))
            }
        }
    }

    /// Contact test for a move of `sign` along `axis`
    ///
    /// Only contact on the side leading the move is reported, so a body
    /// resting on a floor is not blocked sideways by it.
    pub fn colliding_along(&self, axis: Axis, sign: f32, other: &Shape) -> bool {
        match self {
            Shape::Square(square) => square_along(square, axis, sign, other),
            Shape::Circle(circle) => circle_along(circle, axis, sign, other),
            Shape::Triangle(triangle) => triangle
                .edges_facing(Direction::from_axis(axis, sign))
                .iter()
                .any(|edge| edge.colliding(other)),
        }
    }

    pub fn colliding_horizontally(&self, sign: f32, other: &Shape) -> bool {
        self.colliding_along(Axis::Horizontal, sign, other)
    }

    pub fn colliding_vertically(&self, sign: f32, other: &Shape) -> bool {
        self.colliding_along(Axis::Vertical, sign, other)
    }

    /// How far `other` must travel along `axis` to clear this shape moving `sign`
    ///
    /// Signed with the move: positive for `sign > 0`, negative otherwise,
    /// zero when the shapes do not overlap.
    pub fn overlap_along(&self, axis: Axis, sign: f32, other: &Shape) -> f32 {
        overlap::displacement(self, axis, sign, other)
    }

    pub fn overlap_horizontally(&self, sign: f32, other: &Shape) -> f32 {
        self.overlap_along(Axis::Horizontal, sign, other)
    }

    pub fn overlap_vertically(&self, sign: f32, other: &Shape) -> f32 {
        self.overlap_along(Axis::Vertical, sign, other)
    }
}

impl Edge {
    /// Check if the inset segment touches a shape
    pub fn colliding(&self, shape: &Shape) -> bool {
        self.colliding_with(shape, false)
    }

    /// Like [`Edge::colliding`] but without any margin
    pub fn colliding_perfect(&self, shape: &Shape) -> bool {
        self.colliding_with(shape, true)
    }

    fn colliding_with(&self, shape: &Shape, perfect: bool) -> bool {
        match shape {
            Shape::Circle(circle) => self.touches_circle(circle.position, circle.radius, perfect),
            Shape::Square(_) | Shape::Triangle(_) => shape.edges().iter().any(|edge| {
                if perfect {
                    self.intersects_perfect(edge)
                } else {
                    self.intersects(edge)
                }
            }),
        }
    }
}

fn square_along(square: &Square, axis: Axis, sign: f32, other: &Shape) -> bool {
    let edge = square.leading_edge(axis, sign);

    let Shape::Square(remote) = other else {
        return edge.colliding(other);
    };

    match axis {
        Axis::Horizontal => {
            let facing = if sign > 0.0 {
                edge.left() < remote.right() && edge.right() > remote.left() - TOUCH_MARGIN
            } else {
                edge.left() < remote.right() + TOUCH_MARGIN && edge.right() > remote.left()
            };
            facing
                && edge.top() > remote.bottom() + SQUARE_MARGIN_HORIZONTAL
                && edge.bottom() < remote.top() - SQUARE_MARGIN_HORIZONTAL
        }
        Axis::Vertical => {
            let margin = if sign > 0.0 { SQUARE_MARGIN_UP } else { SQUARE_MARGIN_DOWN };
            let facing = if sign > 0.0 {
                edge.bottom() < remote.top() && edge.top() > remote.bottom() - TOUCH_MARGIN
            } else {
                edge.bottom() < remote.top() + TOUCH_MARGIN && edge.top() > remote.bottom()
            };
            facing && edge.left() < remote.right() - margin && edge.right() > remote.left() + margin
        }
    }
}

fn circle_along(circle: &Circle, axis: Axis, sign: f32, other: &Shape) -> bool {
    if circle.profile.requires_bounds_overlap() && !circle.aabb().overlaps(&other.aabb()) {
        return false;
    }

    let limit = circle.profile.collision_angle(axis);
    let direction = axis.unit(sign);
    let within_cone = |edge: &Edge| {
        edge.touches_circle(circle.position, circle.radius, false)
            && angle_between(direction, edge.nearest(circle.position) - circle.position) < limit
    };

    match other {
        Shape::Circle(remote) => {
            let difference = remote.position - circle.position;
            difference.length() <= circle.radius + remote.radius && angle_between(difference, direction) < limit
        }
        Shape::Square(remote) => within_cone(&remote.leading_edge(axis, -sign)),
        Shape::Triangle(remote) => remote
            .edges_facing(Direction::from_axis(axis, -sign))
            .iter()
            .any(within_cone),
    }
}
