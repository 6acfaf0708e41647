use serde::{Deserialize, Serialize};
use tilestep_core::{Directions, Vec2};

use crate::geometry::{Circle, CircleProfile, Shape, Square, Triangle};

/// Collider geometry in body-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColliderShape {
    Square {
        size: Vec2,
    },
    Circle {
        radius: f32,
        #[serde(default)]
        profile: CircleProfile,
    },
    /// Corners relative to the collider centre
    Triangle {
        points: [Vec2; 3],
    },
}

/// A shape attached to a body at a local offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    #[serde(default)]
    pub centre: Vec2,
    pub shape: ColliderShape,
    /// Directions this collider never slides in
    #[serde(default = "Directions::empty")]
    pub slide_veto: Directions,
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            centre: Vec2::ZERO,
            shape,
            slide_veto: Directions::empty(),
        }
    }

    pub fn square(size: Vec2) -> Self {
        Self::new(ColliderShape::Square { size })
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(ColliderShape::Circle {
            radius,
            profile: CircleProfile::Standard,
        })
    }

    pub fn triangle(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self::new(ColliderShape::Triangle { points: [a, b, c] })
    }

    pub fn with_centre(mut self, centre: Vec2) -> Self {
        self.centre = centre;
        self
    }

    /// Only meaningful for circles
    pub fn with_profile(mut self, profile: CircleProfile) -> Self {
        if let ColliderShape::Circle { profile: current, .. } = &mut self.shape {
            *current = profile;
        }
        self
    }

    pub fn with_slide_veto(mut self, veto: Directions) -> Self {
        self.slide_veto = veto;
        self
    }

    /// Place the collider for a body at `position`
    pub fn place(&self, position: Vec2) -> Shape {
        let centre = position + self.centre;
        match self.shape {
            ColliderShape::Square { size } => Shape::Square(Square::new(centre, size)),
            ColliderShape::Circle { radius, profile } => Shape::Circle(Circle::new(centre, radius).with_profile(profile)),
            ColliderShape::Triangle { points } => {
                Shape::Triangle(Triangle::from_points(centre + points[0], centre + points[1], centre + points[2]))
            }
        }
    }

    /// Lowest point relative to the body position
    pub fn local_bottom(&self) -> f32 {
        self.place(Vec2::ZERO).bottom()
    }

    /// Largest distance from the body position to the collider's bounds
    pub fn reach(&self) -> f32 {
        let aabb = self.place(Vec2::ZERO).aabb();
        [aabb.left(), aabb.right(), aabb.bottom(), aabb.top()]
            .into_iter()
            .fold(0.0_f32, |reach, extent| reach.max(extent.abs()))
    }

    pub(crate) fn is_degenerate(&self) -> bool {
        match self.shape {
            ColliderShape::Square { size } => !(size.x > 0.0 && size.y > 0.0),
            ColliderShape::Circle { radius, .. } => !(radius > 0.0),
            ColliderShape::Triangle { points } => {
                let [a, b, c] = points;
                (b - a).perp_dot(c - a).abs() <= f32::EPSILON
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_square() {
        let collider = Collider::square(Vec2::new(1.0, 2.0)).with_centre(Vec2::new(0.0, 1.0));
        let shape = collider.place(Vec2::new(3.0, 0.0));
        assert_eq!(shape.position(), Vec2::new(3.0, 1.0));
        assert_eq!(shape.bottom(), 0.0);
        assert_eq!(collider.local_bottom(), 0.0);
        assert_eq!(collider.reach(), 2.0);
    }

    #[test]
    fn test_place_triangle() {
        let collider = Collider::triangle(Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0));
        let Shape::Triangle(triangle) = collider.place(Vec2::new(10.0, 0.0)) else {
            panic!("expected a triangle");
        };
        assert_eq!(triangle.a(), Vec2::new(9.0, -1.0));
        assert_eq!(triangle.right(), 11.0);
    }

    #[test]
    fn test_profile_only_applies_to_circles() {
        let circle = Collider::circle(0.5).with_profile(CircleProfile::Grounded);
        assert!(matches!(
            circle.shape,
            ColliderShape::Circle {
                profile: CircleProfile::Grounded,
                ..
            }
        ));
        let square = Collider::square(Vec2::ONE).with_profile(CircleProfile::Grounded);
        assert_eq!(square, Collider::square(Vec2::ONE));
    }

    #[test]
    fn test_degenerate_colliders() {
        assert!(Collider::square(Vec2::new(0.0, 1.0)).is_degenerate());
        assert!(Collider::circle(0.0).is_degenerate());
        assert!(Collider::triangle(Vec2::ZERO, Vec2::ONE, Vec2::splat(2.0)).is_degenerate());
        assert!(!Collider::circle(0.5).is_degenerate());
    }

    #[test]
    fn test_collider_from_json() {
        let json = r#"{ "shape": { "type": "circle", "radius": 0.5 }, "slide_veto": "UP" }"#;
        let collider: Collider = serde_json::from_str(json).unwrap();
        assert_eq!(collider.centre, Vec2::ZERO);
        assert!(collider.slide_veto.contains(Directions::UP));
        assert!(matches!(collider.shape, ColliderShape::Circle { radius, .. } if radius == 0.5));
    }
}
